//! Startup data loading.
//!
//! # Responsibility
//! - Warm the branch, car, customer and rental repositories from persistence.
//! - Offer sequential, parallel and bounded-executor orchestration.
//!
//! # See also
//! - `strategy` for per-strategy failure semantics.
//! - `worker_pool` for the executor lifecycle.

pub mod data_loader;
pub mod load_result;
pub mod strategy;
pub mod worker_pool;

use crate::model::EntityKind;
use crate::persistence::DataAccessError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use worker_pool::PoolError;

pub use data_loader::DataLoader;
pub use load_result::LoadResult;
pub use strategy::{load_bounded, ExecutorRun, LoadingStrategy, Scheduler};
pub use worker_pool::{PoolState, WorkerPool};

/// Failure of a whole `DataLoader::load` run.
#[derive(Debug)]
pub enum LoadError {
    /// A collection could not be read or decoded.
    DataAccess {
        entity: EntityKind,
        source: DataAccessError,
    },
    /// A loading task panicked on an executor worker.
    TaskPanicked { entity: EntityKind, message: String },
    /// A task finished without reporting an outcome.
    TaskLost(EntityKind),
    Pool(PoolError),
}

impl LoadError {
    /// Collection whose task failed, when the failure belongs to one.
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Self::DataAccess { entity, .. } | Self::TaskPanicked { entity, .. } => Some(*entity),
            Self::TaskLost(entity) => Some(*entity),
            Self::Pool(_) => None,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataAccess { entity, source } => {
                write!(f, "failed to load {entity}: {source}")
            }
            Self::TaskPanicked { entity, message } => {
                write!(f, "loading task for {entity} panicked: {message}")
            }
            Self::TaskLost(entity) => {
                write!(f, "loading task for {entity} ended without a result")
            }
            Self::Pool(err) => write!(f, "loader worker pool failed: {err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataAccess { source, .. } => Some(source),
            Self::Pool(err) => Some(err),
            Self::TaskPanicked { .. } | Self::TaskLost(_) => None,
        }
    }
}

impl From<PoolError> for LoadError {
    fn from(value: PoolError) -> Self {
        Self::Pool(value)
    }
}
