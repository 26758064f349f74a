/*
[INPUT]:  YAML configuration file, CLI overrides
[OUTPUT]: Parsed board configuration and derived HTTP client settings
[POS]:    Configuration layer - binary setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use taskboard_adapter::{ClientConfig, DEFAULT_BASE_URL};

/// Top-level configuration for the taskboard client
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardConfig {
    /// Task server connection
    #[serde(default)]
    pub server: ServerConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Task server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// API root under which `/task` lives
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "taskboard_core=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BoardConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/taskboard/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskboard").join("config.yaml"))
    }

    /// Load an explicit file, or the default file if it exists, or defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.base_url.trim().is_empty() {
            anyhow::bail!("server.base_url cannot be empty");
        }
        if self.server.timeout_secs == 0 {
            anyhow::bail!("server.timeout_secs must be greater than zero");
        }
        if self.server.connect_timeout_secs == 0 {
            anyhow::bail!("server.connect_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// HTTP client settings derived from the server section
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.server.timeout_secs),
            connect_timeout: Duration::from_secs(self.server.connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = BoardConfig::from_yaml("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.server.base_url, "http://localhost:8080/api");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let yaml = r#"
server:
  base_url: "http://tasks.internal:9000/api"
  timeout_secs: 5
logging:
  file: /tmp/taskboard.log
"#;
        let config = BoardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://tasks.internal:9000/api");
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.connect_timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/taskboard.log")));
    }

    #[test]
    fn test_client_config_uses_seconds() {
        let mut config = BoardConfig::default();
        config.server.timeout_secs = 3;
        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let yaml = "server:\n  timeout_secs: 0\n";
        assert!(BoardConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = BoardConfig::load(Some(Path::new("/nonexistent/taskboard.yaml"))).unwrap_err();
        assert!(err.to_string().contains("read config file"));
    }
}
