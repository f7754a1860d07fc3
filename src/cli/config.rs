//! Configuration file
//!
//! Every field is optional. A config path that does not exist yields the
//! defaults; a file that exists must parse and validate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::store::DEFAULT_DATA_FILE_NAME;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Data file holding the full record set
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Minimum log severity: trace, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP surface used by `serve`
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_data_file() -> PathBuf {
    Path::new(".").join("data").join(DEFAULT_DATA_FILE_NAME)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: default_log_level(),
            http: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CliError::config_error(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate field values
    fn validate(&self) -> CliResult<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(CliError::config_error("data_file must not be empty"));
        }

        if self.data_file.is_dir() {
            return Err(CliError::config_error(format!(
                "data_file {} is a directory",
                self.data_file.display()
            )));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(e))
    }

    /// HTTP settings with an optional port override
    pub fn http_config(&self, port: Option<u16>) -> HttpServerConfig {
        let mut http = self.http.clone();
        if let Some(port) = port {
            http.port = port;
        }
        http
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.data_file.ends_with("data/loanApplication.json"));
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loandesk.json");
        fs::write(&path, r#"{"log_level": "warn", "http": {"port": 7000}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.severity().unwrap(), Severity::Warn);
        assert_eq!(config.http.port, 7000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.data_file, default_data_file());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loandesk.json");
        fs::write(&path, r#"{"log_level": "verbose"}"#).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_rejects_directory_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loandesk.json");
        let config = serde_json::json!({ "data_file": temp_dir.path() });
        fs::write(&path, config.to_string()).unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loandesk.json");
        fs::write(&path, "{").unwrap();

        assert_eq!(
            Config::load(&path).unwrap_err().code(),
            &CliErrorCode::ConfigError
        );
    }

    #[test]
    fn test_port_override() {
        let config = Config::default();
        assert_eq!(config.http_config(Some(8081)).port, 8081);
        assert_eq!(config.http_config(None).port, 5000);
    }
}
