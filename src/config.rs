//! Dashboard configuration.
//!
//! Settings come from `shopwise.json` in the working directory (or the file named by
//! `SHOPWISE_CONFIG`), falling back to defaults. `SHOPWISE_DATA` overrides the dataset path.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "shopwise.json";
pub const CONFIG_ENV: &str = "SHOPWISE_CONFIG";
pub const DATA_ENV: &str = "SHOPWISE_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV loaded at startup.
    pub data_path: PathBuf,
    /// Rows scanned to infer column types.
    pub infer_schema_length: usize,
    /// Skip unparseable cells (read as missing) instead of failing the load.
    pub ignore_parse_errors: bool,
    pub export_dir: PathBuf,
    pub export_width: u32,
    pub export_height: u32,
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("shop-wise-trans-details_12_2024.csv"),
            infer_schema_length: 10000,
            ignore_parse_errors: false,
            export_dir: PathBuf::from("exports"),
            export_width: 1200,
            export_height: 800,
            log_filter: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the effective config from the environment.
    ///
    /// An explicitly named config file must exist; the default one is optional.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }

        Ok(config)
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_bundled_dataset() {
        let config = DashboardConfig::default();
        assert_eq!(
            config.data_path,
            PathBuf::from("shop-wise-trans-details_12_2024.csv")
        );
        assert_eq!(config.infer_schema_length, 10000);
        assert!(!config.ignore_parse_errors);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "december.csv", "export_width": 640 }}"#).unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("december.csv"));
        assert_eq!(config.export_width, 640);
        assert_eq!(config.export_height, 800);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "data_path = 'x'").unwrap();

        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/shopwise.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
