//! flotilla.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlotillaConfig {
    pub logging: LoggingConfig,
    pub simulate: SimulateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,flotilla=debug".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulateConfig {
    /// Upper bound on evaluate/apply cycles.
    pub max_cycles: u32,
    /// Advance `targetStep` whenever the contender waits for a command.
    pub auto_promote: bool,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            max_cycles: 32,
            auto_promote: true,
        }
    }
}

impl FlotillaConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::new(ErrorKind::Config, path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::new(ErrorKind::Config, path.display().to_string(), e.detail()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::new(ErrorKind::Config, "flotilla.toml", e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::new(ErrorKind::Config, "flotilla.toml", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let config = FlotillaConfig::from_toml_str("").unwrap();
        assert_eq!(config, FlotillaConfig::default());
        assert_eq!(config.simulate.max_cycles, 32);
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[logging]
filter = "warn"
format = "json"

[simulate]
max_cycles = 4
auto_promote = false
"#;
        let config = FlotillaConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.simulate.max_cycles, 4);
        assert!(!config.simulate.auto_promote);
    }

    #[test]
    fn unknown_key_is_config_error() {
        let err = FlotillaConfig::from_toml_str("[logging]\nlevel = \"info\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flotilla.toml");
        let config = FlotillaConfig::default();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(FlotillaConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = FlotillaConfig::from_file(Path::new("/nonexistent/flotilla.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.subject(), "/nonexistent/flotilla.toml");
    }
}
