//! Bridge between persistence and repositories.

use super::load_result::LoadResult;
use super::strategy::LoadingStrategy;
use super::LoadError;
use crate::model::EntityKind;
use crate::persistence::{DataFormat, DataResult, Persistence};
use crate::repo::entities::EntityRepositories;
use crate::repo::repository::Repository;
use log::{error, info};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Loads persisted collections into repositories.
///
/// One loader is shared by all tasks of a strategy run, so it only needs
/// shared access to the persistence backend.
#[derive(Debug)]
pub struct DataLoader<P: Persistence> {
    persistence: P,
    format: DataFormat,
}

impl<P: Persistence> DataLoader<P> {
    /// Creates a loader reading JSON sources.
    pub fn new(persistence: P) -> Self {
        Self::with_format(persistence, DataFormat::Json)
    }

    pub fn with_format(persistence: P, format: DataFormat) -> Self {
        info!("event=loader_init module=loader status=ok format={format}");
        Self {
            persistence,
            format,
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Loads one collection and inserts it into `repository`.
    ///
    /// Returns how many records the repository actually gained, so records
    /// duplicating existing contents are not counted.
    ///
    /// # Errors
    /// Propagates the persistence `DataAccessError` unchanged; the
    /// repository is untouched in that case.
    pub fn load_entity<T: DeserializeOwned>(
        &self,
        entity: EntityKind,
        repository: &mut Repository<T>,
    ) -> DataResult<usize> {
        let started_at = Instant::now();
        let size_before = repository.len();

        let items: Vec<T> = match self.persistence.load(entity.as_str(), self.format) {
            Ok(items) => items,
            Err(err) => {
                error!(
                    "event=load_entity module=loader status=error entity={} format={} duration_ms={} error={}",
                    entity,
                    self.format,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };
        let fetched = items.len();
        repository.add_all(items);
        let loaded = repository.len() - size_before;

        info!(
            "event=load_entity module=loader status=ok entity={} format={} fetched={} loaded={} duration_ms={}",
            entity,
            self.format,
            fetched,
            loaded,
            started_at.elapsed().as_millis()
        );
        Ok(loaded)
    }

    /// Warms branches, cars, customers and rentals using `strategy`.
    pub fn load(
        &self,
        repositories: &mut EntityRepositories,
        strategy: &LoadingStrategy,
    ) -> Result<LoadResult, LoadError> {
        info!(
            "event=load module=loader status=start strategy={}",
            strategy.name()
        );
        let outcome = strategy.run(self, repositories);
        match &outcome {
            Ok(result) => info!(
                "event=load module=loader status=ok strategy={} total={} duration_ms={}",
                strategy.name(),
                result.total_loaded(),
                result.duration_ms()
            ),
            Err(err) => error!(
                "event=load module=loader status=error strategy={} error={}",
                strategy.name(),
                err
            ),
        }
        outcome
    }
}
