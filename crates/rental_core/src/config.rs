//! Application configuration.
//!
//! # Responsibility
//! - Load data-location and loader settings from a YAML or JSON file.
//! - Resolve per-entity file paths for each data format.
//!
//! # Invariants
//! - Missing keys take documented defaults; the file itself must exist.
//! - Absolute file overrides are used verbatim, relative ones resolve
//!   against `data_dir`.
//! - A loaded config's relative `data_dir` is anchored at the config file's
//!   directory, not the working directory.

use crate::persistence::DataFormat;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_POOL_SIZE: usize = 4;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 60;

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    UnsupportedExtension(PathBuf),
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config file `{}` does not exist", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "failed to parse JSON config `{}`: {source}", path.display())
            }
            Self::Yaml { path, source } => {
                write!(f, "failed to parse YAML config `{}`: {source}", path.display())
            }
            Self::UnsupportedExtension(path) => write!(
                f,
                "unsupported config extension for `{}`; expected .yaml|.yml|.json",
                path.display()
            ),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
            Self::NotFound(_) | Self::UnsupportedExtension(_) | Self::InvalidValue { .. } => None,
        }
    }
}

/// Worker pool settings for the bounded-executor loading strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub pool_size: usize,
    pub shutdown_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl LoaderConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base directory for relative data file names.
    pub data_dir: PathBuf,
    pub default_format: DataFormat,
    /// Per-collection file overrides keyed by `<entity>.<extension>`,
    /// e.g. `cars.json`.
    pub files: BTreeMap<String, String>,
    pub loader: LoaderConfig,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_format: DataFormat::Json,
            files: BTreeMap::new(),
            loader: LoaderConfig::default(),
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Config rooted at `data_dir` with every other setting defaulted.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Reads a `.yaml`/`.yml`/`.json` config file.
    ///
    /// A relative `data_dir` is resolved against the directory holding the
    /// config file.
    ///
    /// # Errors
    /// - `NotFound` when the file is absent.
    /// - `UnsupportedExtension` for other extensions.
    /// - `Json`/`Yaml` on parse failures, `InvalidValue` on bad settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let mut config: AppConfig = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|source| {
                ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            "json" => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => return Err(ConfigError::UnsupportedExtension(path.to_path_buf())),
        };
        config.validate()?;
        if config.data_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.data_dir = base.join(&config.data_dir);
            }
        }

        info!(
            "event=config_load module=config status=ok path={} data_dir={}",
            path.display(),
            config.data_dir.display()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "loader.pool_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolves the file holding `entity_type` in `format`.
    ///
    /// Falls back to `<entity>.<extension>` when no override exists.
    pub fn file_path(&self, entity_type: &str, format: DataFormat) -> PathBuf {
        let entity = entity_type.trim().to_lowercase();
        let key = format!("{entity}.{}", format.extension());
        let file_name = match self.files.get(&key) {
            Some(name) => name.clone(),
            None => {
                debug!("event=config_path module=config status=ok source=default key={key}");
                key
            }
        };

        let file = Path::new(&file_name);
        if file.is_absolute() {
            return file.to_path_buf();
        }
        self.data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::persistence::DataFormat;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn file_path_uses_override_then_default_name() {
        let mut config = AppConfig::with_data_dir("/srv/rental");
        config
            .files
            .insert("cars.json".to_string(), "fleet.json".to_string());

        assert_eq!(
            config.file_path("Cars", DataFormat::Json),
            PathBuf::from("/srv/rental/fleet.json")
        );
        assert_eq!(
            config.file_path("cars", DataFormat::Yaml),
            PathBuf::from("/srv/rental/cars.yaml")
        );
    }

    #[test]
    fn absolute_override_is_used_verbatim() {
        let mut config = AppConfig::default();
        config
            .files
            .insert("rentals.yaml".to_string(), "/var/rentals.yaml".to_string());

        assert_eq!(
            config.file_path("rentals", DataFormat::Yaml),
            PathBuf::from("/var/rentals.yaml")
        );
    }

    #[test]
    fn relative_data_dir_resolves_against_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("etc");
        fs::create_dir_all(&nested).unwrap();
        let config_path = nested.join("rental.yaml");
        fs::write(&config_path, "data_dir: ./data\n").unwrap();

        let config = AppConfig::load(&config_path).unwrap();
        assert_eq!(config.data_dir, nested.join("./data"));
        assert_eq!(
            config.file_path("cars", DataFormat::Json),
            nested.join("./data").join("cars.json")
        );
    }

    #[test]
    fn absolute_data_dir_is_kept_and_missing_key_uses_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("store");
        let with_absolute = dir.path().join("absolute.json");
        fs::write(
            &with_absolute,
            format!(r#"{{"data_dir":{}}}"#, serde_json::to_string(&absolute).unwrap()),
        )
        .unwrap();
        assert_eq!(AppConfig::load(&with_absolute).unwrap().data_dir, absolute);

        let defaults = dir.path().join("defaults.yaml");
        fs::write(&defaults, "loader:\n  pool_size: 2\n").unwrap();
        assert_eq!(
            AppConfig::load(&defaults).unwrap().data_dir,
            dir.path().join("./data")
        );
    }
}
