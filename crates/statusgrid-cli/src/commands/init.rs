//! `statusgrid init`: write a starter config.

use std::path::Path;

use statusgrid_core::Config;

pub fn run(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists, not overwriting", path.display());
    }
    let config = Config::scaffold();
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Wrote starter config to {}", path.display());
    println!("  Edit the [[sources]] and [[targets]] entries, then run: statusgrid poll");
    Ok(())
}
