//! statusgrid.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::policy::RetryPolicy;
use crate::types::TargetQuery;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration {value:?} for {field} (expected e.g. \"500ms\", \"5s\", \"2m\")")]
    Duration { field: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Root of a statusgrid.toml file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub transport: TransportSection,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

/// `[retry]` backoff tuning. Absent fields fall back to
/// `RetryPolicy::default()`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    /// Delay before the first retry (e.g., "200ms").
    pub base_delay: Option<String>,
    pub multiplier: Option<f64>,
    /// Cap on any single backoff delay (e.g., "5s").
    pub max_delay: Option<String>,
}

/// `[transport]` HTTP client tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransportSection {
    /// Deadline per status call (e.g., "2s").
    pub request_timeout: Option<String>,
}

/// `[[sources]]` entry: one pollable status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    /// Base URL, e.g. "http://10.0.0.1:8443".
    pub endpoint: String,
}

/// `[[targets]]` entry: one deployment to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    pub name: String,
    pub namespace: String,
    /// Name of the `[[sources]]` entry to poll this target from.
    pub source: String,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the retry policy, applying defaults for absent fields.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let defaults = RetryPolicy::default();
        Ok(RetryPolicy {
            max_retries: self.retry.max_retries.unwrap_or(defaults.max_retries),
            base_delay: opt_duration("retry.base_delay", &self.retry.base_delay)?
                .unwrap_or(defaults.base_delay),
            multiplier: self.retry.multiplier.unwrap_or(defaults.multiplier),
            max_delay: opt_duration("retry.max_delay", &self.retry.max_delay)?
                .unwrap_or(defaults.max_delay),
        })
    }

    /// Per-request transport deadline (default 2s).
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        Ok(
            opt_duration("transport.request_timeout", &self.transport.request_timeout)?
                .unwrap_or(Duration::from_secs(2)),
        )
    }

    /// The configured targets as poll queries, in file order.
    pub fn target_queries(&self) -> Vec<TargetQuery> {
        self.targets
            .iter()
            .map(|t| TargetQuery::new(&t.name, &t.namespace, &t.source))
            .collect()
    }

    /// Source name to base endpoint map.
    pub fn source_endpoints(&self) -> HashMap<String, String> {
        self.sources
            .iter()
            .map(|s| (s.name.clone(), s.endpoint.clone()))
            .collect()
    }

    /// Check cross-references and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut source_names = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(ConfigError::Invalid("source with empty name".into()));
            }
            if endpoint_authority(&source.endpoint).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "source {:?} endpoint {:?} must be a plain http://host:port URL",
                    source.name, source.endpoint
                )));
            }
            if !source_names.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source {:?}",
                    source.name
                )));
            }
        }

        let mut target_keys = HashSet::new();
        for target in &self.targets {
            if target.name.is_empty() || target.namespace.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "target {:?} must have a name and a namespace",
                    target.name
                )));
            }
            if !source_names.contains(target.source.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "target {}/{} references unknown source {:?}",
                    target.namespace, target.name, target.source
                )));
            }
            let key = format!("{}/{}/{}", target.source, target.namespace, target.name);
            if !target_keys.insert(key.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate target {key}")));
            }
        }

        if let Some(multiplier) = self.retry.multiplier {
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "retry.multiplier must be >= 1.0, got {multiplier}"
                )));
            }
        }

        // Surface bad duration strings at validation time, not mid-poll.
        self.retry_policy()?;
        self.request_timeout()?;
        Ok(())
    }

    /// Scaffold a starter statusgrid.toml.
    pub fn scaffold() -> Self {
        Config {
            retry: RetrySection {
                max_retries: Some(3),
                base_delay: Some("200ms".to_string()),
                multiplier: Some(2.0),
                max_delay: Some("5s".to_string()),
            },
            transport: TransportSection {
                request_timeout: Some("2s".to_string()),
            },
            sources: vec![SourceEntry {
                name: "local".to_string(),
                endpoint: "http://127.0.0.1:8443".to_string(),
            }],
            targets: vec![
                TargetEntry {
                    name: "checkout-api".to_string(),
                    namespace: "prod".to_string(),
                    source: "local".to_string(),
                },
                TargetEntry {
                    name: "billing-worker".to_string(),
                    namespace: "prod".to_string(),
                    source: "local".to_string(),
                },
            ],
        }
    }
}

/// Parse durations of the form "500ms", "5s", "2m", or a plain number
/// of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Extract `host:port` from a plain `http://` base endpoint.
///
/// Shared by `Config::validate` and the HTTP transport, so an endpoint
/// that validates is one the transport can dial.
pub fn endpoint_authority(endpoint: &str) -> Option<&str> {
    let authority = endpoint.strip_prefix("http://")?.trim_end_matches('/');
    if authority.is_empty() || authority.contains('/') {
        return None;
    }
    Some(authority)
}

fn opt_duration(
    field: &'static str,
    value: &Option<String>,
) -> Result<Option<Duration>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_duration(raw)
            .map(Some)
            .ok_or_else(|| ConfigError::Duration {
                field,
                value: raw.clone(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Config {
        toml::from_str(
            r#"
[retry]
max_retries = 2
base_delay = "50ms"
multiplier = 3.0
max_delay = "2s"

[transport]
request_timeout = "500ms"

[[sources]]
name = "us-east"
endpoint = "http://10.0.0.1:8443"

[[sources]]
name = "eu-west"
endpoint = "http://10.1.0.1:8443"

[[targets]]
name = "checkout-api"
namespace = "prod"
source = "us-east"

[[targets]]
name = "checkout-api"
namespace = "prod"
source = "eu-west"
"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_full_config() {
        let config = full_config();
        config.validate().unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.targets.len(), 2);
        assert_eq!(
            config.source_endpoints().get("eu-west").map(String::as_str),
            Some("http://10.1.0.1:8443")
        );
        assert_eq!(config.request_timeout().unwrap(), Duration::from_millis(500));

        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.multiplier, 3.0);
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn empty_config_gets_defaults() {
        let config: Config = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.retry_policy().unwrap(), RetryPolicy::default());
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(2));
        assert!(config.target_queries().is_empty());
    }

    #[test]
    fn target_queries_preserve_file_order() {
        let queries = full_config().target_queries();
        assert_eq!(queries[0].key(), "us-east/prod/checkout-api");
        assert_eq!(queries[1].key(), "eu-west/prod/checkout-api");
    }

    #[test]
    fn rejects_unknown_source() {
        let mut config = full_config();
        config.targets[0].source = "ap-south".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown source"));
    }

    #[test]
    fn rejects_duplicate_target() {
        let mut config = full_config();
        config.targets[1] = config.targets[0].clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate target"));
    }

    #[test]
    fn rejects_shrinking_multiplier() {
        let mut config = full_config();
        config.retry.multiplier = Some(0.5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("multiplier"));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = full_config();
        config.sources[0].endpoint = "ftp://10.0.0.1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_endpoint_with_a_path() {
        let mut config = full_config();
        config.sources[0].endpoint = "http://10.0.0.1:8443/api".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plain http://host:port"));

        // A bare trailing slash is still fine.
        config.sources[0].endpoint = "http://10.0.0.1:8443/".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn rejects_bad_duration() {
        let mut config = full_config();
        config.retry.base_delay = Some("soon".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Duration { field, .. } if field == "retry.base_delay"));
    }

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
    }

    #[test]
    fn parse_duration_milliseconds() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
    }

    #[test]
    fn parse_duration_minutes() {
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn parse_duration_plain_number_as_seconds() {
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn parse_duration_rejects_overflowing_minutes() {
        // 307445734561825861 * 60 does not fit in u64; one less does.
        assert_eq!(parse_duration("307445734561825861m"), None);
        assert_eq!(
            parse_duration("307445734561825860m"),
            Some(Duration::from_secs(18_446_744_073_709_551_600))
        );
    }

    #[test]
    fn scaffold_round_trips() {
        let config = Config::scaffold();
        let rendered = config.to_toml_string().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.targets.len(), 2);
        assert_eq!(parsed.sources[0].name, "local");
    }
}
