//! Config-driven file store.
//!
//! # Responsibility
//! - Map `(entity_type, format)` to a file via `AppConfig`.
//! - Read/write whole collections with the matching codec.
//!
//! # Invariants
//! - A missing file is an error; a zero-length file is an empty collection.
//! - Saving creates missing parent directories.

use super::codec::{list_from_string, list_to_string};
use super::{DataAccessError, DataFormat, DataResult, Persistence};
use crate::config::AppConfig;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Persistence backed by one file per collection and format.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    config: AppConfig,
}

impl FilePersistence {
    pub fn new(config: AppConfig) -> Self {
        debug!(
            "event=persistence_init module=persistence status=ok data_dir={} formats=JSON,YAML",
            config.data_dir.display()
        );
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Writes `items` in every supported format.
    pub fn save_all_formats<T: Serialize>(&self, items: &[T], entity_type: &str) -> DataResult<()> {
        for format in DataFormat::ALL {
            self.save(items, entity_type, format)?;
        }
        info!(
            "event=persistence_save_all module=persistence status=ok entity={} count={}",
            entity_type.trim(),
            items.len()
        );
        Ok(())
    }

    fn resolve(&self, entity_type: &str, format: DataFormat) -> DataResult<PathBuf> {
        let entity = entity_type.trim();
        if entity.is_empty() {
            return Err(DataAccessError::EmptyEntityType);
        }
        Ok(self.config.file_path(entity, format))
    }
}

impl Persistence for FilePersistence {
    fn load<T: DeserializeOwned>(
        &self,
        entity_type: &str,
        format: DataFormat,
    ) -> DataResult<Vec<T>> {
        let path = self.resolve(entity_type, format)?;
        let started_at = Instant::now();

        match read_collection(&path, format) {
            Ok(items) => {
                info!(
                    "event=persistence_load module=persistence status=ok entity={} format={} path={} count={} duration_ms={}",
                    entity_type.trim(),
                    format,
                    path.display(),
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(items)
            }
            Err(err) => {
                error!(
                    "event=persistence_load module=persistence status=error entity={} format={} path={} error={}",
                    entity_type.trim(),
                    format,
                    path.display(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save<T: Serialize>(
        &self,
        items: &[T],
        entity_type: &str,
        format: DataFormat,
    ) -> DataResult<()> {
        let path = self.resolve(entity_type, format)?;

        match write_collection(&path, items, format) {
            Ok(()) => {
                info!(
                    "event=persistence_save module=persistence status=ok entity={} format={} path={} count={}",
                    entity_type.trim(),
                    format,
                    path.display(),
                    items.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=persistence_save module=persistence status=error entity={} format={} path={} error={}",
                    entity_type.trim(),
                    format,
                    path.display(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path, format: DataFormat) -> DataResult<Vec<T>> {
    if !path.exists() {
        return Err(DataAccessError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| DataAccessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.is_empty() {
        warn!(
            "event=persistence_load module=persistence status=warn reason=empty_file path={}",
            path.display()
        );
        return Ok(Vec::new());
    }

    let context = format!(
        "failed to deserialize data from {} file {}",
        format,
        path.display()
    );
    list_from_string(&contents, format, &context)
}

fn write_collection<T: Serialize>(path: &Path, items: &[T], format: DataFormat) -> DataResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| DataAccessError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            debug!(
                "event=persistence_mkdir module=persistence status=ok path={}",
                parent.display()
            );
        }
    }

    let encoded = list_to_string(items, format)?;
    std::fs::write(path, encoded).map_err(|source| DataAccessError::Io {
        path: path.to_path_buf(),
        source,
    })
}
