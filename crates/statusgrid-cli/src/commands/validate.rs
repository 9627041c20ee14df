//! `statusgrid validate`: check a config file without polling.

use anyhow::Context;
use std::path::Path;

use statusgrid_core::Config;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;
    println!(
        "✓ {} looks good: {} targets across {} sources",
        config_path.display(),
        config.targets.len(),
        config.sources.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statusgrid.toml");
        std::fs::write(
            &path,
            r#"
[[sources]]
name = "local"
endpoint = "http://127.0.0.1:8443"

[[targets]]
name = "api"
namespace = "prod"
source = "local"
"#,
        )
        .unwrap();
        run(&path).unwrap();
    }

    #[test]
    fn rejects_a_broken_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statusgrid.toml");
        std::fs::write(
            &path,
            r#"
[[targets]]
name = "api"
namespace = "prod"
source = "nowhere"
"#,
        )
        .unwrap();
        let err = run(&path).unwrap_err();
        assert!(err.to_string().contains("unknown source"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = run(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("not/here.toml"));
    }
}
