//! Configuration loading for the PRISM TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use crate::fanout::CountFailurePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub persistence_path: PathBuf,
    pub error_log_path: PathBuf,
    pub theme: ThemeConfig,
    pub fetch: FetchConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Most recent semantic entities to request.
    pub entity_limit: usize,
    /// Upper bound on in-flight per-agent count requests.
    pub agent_count_concurrency: usize,
    pub count_failure_policy: CountFailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub radius: f64,
    pub default_min_strength: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or PRISM_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api_base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.auth.api_key.is_none() && self.auth.jwt.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "auth",
                reason: "api_key or jwt must be provided".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.error_log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "error_log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.theme.name.to_ascii_lowercase() != "synthbrute" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'synthbrute' is supported".to_string(),
            });
        }
        if self.fetch.entity_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.entity_limit",
                reason: "must be > 0".to_string(),
            });
        }
        if self.fetch.agent_count_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.agent_count_concurrency",
                reason: "must be > 0".to_string(),
            });
        }
        if !self.graph.radius.is_finite() || self.graph.radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "graph.radius",
                reason: "must be a positive number".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.graph.default_min_strength) {
            return Err(ConfigError::InvalidValue {
                field: "graph.default_min_strength",
                reason: "must be within 0.0..=1.0".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("PRISM_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
api_base_url = "https://backend.example"
request_timeout_ms = 10000
refresh_interval_ms = 250
persistence_path = "/tmp/prism/state.json"
error_log_path = "/tmp/prism/prism.log"

[auth]
api_key = "anon-key"

[theme]
name = "synthbrute"

[fetch]
entity_limit = 500
agent_count_concurrency = 8
count_failure_policy = "zero"

[graph]
radius = 300.0
default_min_strength = 0.0
"#;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config = TuiConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.fetch.count_failure_policy, CountFailurePolicy::Zero);
        assert_eq!(config.fetch.entity_limit, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let contents = format!("{}\nextra = true\n", SAMPLE.replace("[auth]", "bogus = 1\n[auth]"));
        assert!(matches!(
            TuiConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_section_rejected() {
        let contents = SAMPLE.replace("[graph]\nradius = 300.0\ndefault_min_strength = 0.0\n", "");
        assert!(TuiConfig::from_toml(&contents).is_err());
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prism.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = TuiConfig::from_path(&path).unwrap();
        assert_eq!(config.api_base_url, "https://backend.example");
    }

    #[test]
    fn test_base_url_scheme_required() {
        let mut config = TuiConfig::from_toml(SAMPLE).unwrap();
        config.api_base_url = "backend.example".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "api_base_url", .. })
        ));
    }
}
