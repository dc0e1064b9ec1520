/*
[INPUT]:  Optional YAML configuration file, TODO_GATE__* environment variables
[OUTPUT]: Parsed application configuration
[POS]:    Configuration layer - storage location, gate timing, logging
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::AuthTiming;
use crate::error::ConfigError;

const ENV_PREFIX: &str = "TODO_GATE";
const MAX_DELAY_MS: u64 = 60_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding persisted data; defaults to the platform data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Mock scanner timing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub scan_delay_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            scan_delay_ms: 2500,
            settle_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing EnvFilter directive
    pub level: String,
    /// Lines kept for the in-app log panel
    pub buffer_capacity: usize,
    /// Optional log file, written in addition to the log panel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            buffer_capacity: 2000,
            file: None,
        }
    }
}

/// `TODO_GATE__AUTH__SCAN_DELAY_MS` maps to `auth.scan_delay_ms`
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Layer defaults, an optional YAML file and environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layered(path, environment())
    }

    fn load_layered(path: Option<&Path>, env: config::Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(env);

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string (no environment layering)
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.scan_delay_ms > MAX_DELAY_MS || self.auth.settle_delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "scan delays must not exceed {MAX_DELAY_MS} ms"
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log level cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn timing(&self) -> AuthTiming {
        AuthTiming {
            scan_delay: Duration::from_millis(self.auth.scan_delay_ms),
            settle_delay: Duration::from_millis(self.auth.settle_delay_ms),
        }
    }

    /// Configured data dir, or `<platform data dir>/todo-gate`
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("todo-gate"))
            .ok_or_else(|| ConfigError::Invalid("could not determine data directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.timing(), AuthTiming::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.buffer_capacity, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "data_dir: /tmp/todo-gate\nauth:\n  scan_delay_ms: 100\n",
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/todo-gate")));
        assert_eq!(config.auth.scan_delay_ms, 100);
        assert_eq!(config.auth.settle_delay_ms, 1000);
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/tmp/todo-gate"));
    }

    #[test]
    fn test_rejects_excessive_delay() {
        let result = AppConfig::from_yaml_str("auth:\n  settle_delay_ms: 120000\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = AppConfig::default();
        config.auth.scan_delay_ms = 10;
        config.logging.level = "debug".to_string();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(AppConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "logging:\n  level: warn").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/todo-gate.yaml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "auth:\n  scan_delay_ms: 100\n  settle_delay_ms: 300\nlogging:\n  level: warn"
        )
        .unwrap();

        let vars: config::Map<String, String> = [
            ("TODO_GATE__AUTH__SCAN_DELAY_MS", "42"),
            ("TODO_GATE__LOGGING__BUFFER_CAPACITY", "64"),
            ("OTHER_APP__AUTH__SETTLE_DELAY_MS", "7"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config =
            AppConfig::load_layered(Some(file.path()), environment().source(Some(vars))).unwrap();
        assert_eq!(config.auth.scan_delay_ms, 42);
        assert_eq!(config.auth.settle_delay_ms, 300);
        assert_eq!(config.logging.buffer_capacity, 64);
        assert_eq!(config.logging.level, "warn");
    }
}
