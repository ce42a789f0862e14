//! File-backed persistence for rental collections.
//!
//! # Responsibility
//! - Define the `Persistence` contract consumed by the data loader.
//! - Provide JSON/YAML codecs and a config-driven file store.
//!
//! # Invariants
//! - Every failure surfaces as `DataAccessError` with the offending path or
//!   codec context attached.
//! - Loaded records pass model validation; invalid records fail the load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub mod codec;
mod file_store;

pub use file_store::FilePersistence;

pub type DataResult<T> = Result<T, DataAccessError>;

/// On-disk serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Json,
    #[serde(alias = "yml")]
    Yaml,
}

impl DataFormat {
    pub const ALL: [DataFormat; 2] = [DataFormat::Json, DataFormat::Yaml];

    /// File extension, also used as the config key suffix.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

impl FromStr for DataFormat {
    type Err = DataAccessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(DataAccessError::UnsupportedFormat(value.to_string())),
        }
    }
}

impl Display for DataFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure to read, write or decode a persisted collection.
#[derive(Debug)]
pub enum DataAccessError {
    EmptyEntityType,
    UnsupportedFormat(String),
    NotFound(PathBuf),
    EmptyInput,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        context: String,
        source: serde_json::Error,
    },
    Yaml {
        context: String,
        source: serde_yaml::Error,
    },
    /// Source unavailable for a reason without an underlying error value.
    Unavailable(String),
}

impl Display for DataAccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEntityType => write!(f, "entity type cannot be empty"),
            Self::UnsupportedFormat(value) => {
                write!(f, "unsupported format `{value}`; expected JSON|YAML")
            }
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::EmptyInput => write!(f, "cannot deserialize empty input"),
            Self::Io { path, source } => write!(f, "i/o error on {}: {source}", path.display()),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::Yaml { context, source } => write!(f, "{context}: {source}"),
            Self::Unavailable(message) => write!(f, "data source unavailable: {message}"),
        }
    }
}

impl Error for DataAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
            Self::EmptyEntityType
            | Self::UnsupportedFormat(_)
            | Self::NotFound(_)
            | Self::EmptyInput
            | Self::Unavailable(_) => None,
        }
    }
}

/// Load/save contract for ordered record collections.
///
/// Implementations must be shareable across loader worker threads.
pub trait Persistence: Send + Sync {
    /// Loads every record of `entity_type` stored in `format`.
    fn load<T: DeserializeOwned>(&self, entity_type: &str, format: DataFormat)
        -> DataResult<Vec<T>>;

    /// Replaces the stored `entity_type` collection with `items`.
    fn save<T: Serialize>(
        &self,
        items: &[T],
        entity_type: &str,
        format: DataFormat,
    ) -> DataResult<()>;
}
