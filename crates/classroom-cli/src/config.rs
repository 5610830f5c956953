//! Application configuration loaded from TOML

use classroom_api::ClientConfig;
use classroom_coloring::ColoringConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`AppConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Whole-application configuration
///
/// ```toml
/// [api]
/// base_url = "https://school.example/api"
///
/// [coloring]
/// outline_width_threshold = 1.5
///
/// [log]
/// json = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API client section
    pub api: ClientConfig,
    /// Coloring engine section
    pub coloring: ColoringConfig,
    /// Logging section
    pub log: LogConfig,
}

impl AppConfig {
    /// Parse from TOML text
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("classroom.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let text = r#"
            [api]
            base_url = "https://school.example/api"
            login_route = "/signin"

            [coloring]
            outline_width_threshold = 1.5
            default_file_name = "my-coloring"

            [log]
            json = true
        "#;
        let config = AppConfig::from_toml(text, Path::new("inline")).unwrap();

        assert_eq!(config.api.base_url, "https://school.example/api");
        assert_eq!(config.api.login_route, "/signin");
        assert_eq!(config.api.refresh_path, "/auth/refresh");
        assert!((config.coloring.outline_width_threshold - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.coloring.default_file_name, "my-coloring");
        assert!(config.log.json);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn invalid_toml_reports_path() {
        let err = AppConfig::from_toml("[api\nbase_url = 1", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classroom.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
    }
}
