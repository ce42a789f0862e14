//! Core data management for the car rental system.
//! This crate is the single source of truth for record invariants,
//! repository semantics and startup loading.

pub mod config;
pub mod csv_import;
pub mod loader;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod report;

pub use config::{AppConfig, ConfigError, LoaderConfig};
pub use loader::{DataLoader, LoadError, LoadResult, LoadingStrategy, Scheduler};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::{DefaultOrder, EntityKind};
pub use persistence::{DataAccessError, DataFormat, DataResult, FilePersistence, Persistence};
pub use repo::entities::EntityRepositories;
pub use repo::repository::{Repository, RepositoryError, RepositoryResult, SortOrder};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
