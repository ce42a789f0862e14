//! Loading strategies for warming the four startup collections.
//!
//! # Responsibility
//! - Orchestrate one load per collection (branches, cars, customers,
//!   rentals) under the selected concurrency model.
//! - Compose a positional `LoadResult` regardless of completion order.
//!
//! # Invariants
//! - Each repository is written by exactly one task per run; disjoint
//!   `&mut` borrows enforce this.
//! - `Sequential` fails on the first error with no partial result.
//! - `Parallel` isolates failures per collection and always returns a result.
//! - `BoundedExecutor` fails the whole run on any task failure, and only
//!   after its worker pool reached a terminal state.
//! - Durations cover dispatch through completion of every task.

use super::data_loader::DataLoader;
use super::load_result::LoadResult;
use super::worker_pool::{PoolState, WorkerPool};
use super::LoadError;
use crate::config::{LoaderConfig, DEFAULT_POOL_SIZE, DEFAULT_SHUTDOWN_TIMEOUT_SECS};
use crate::model::branch::Branch;
use crate::model::car::Car;
use crate::model::customer::Customer;
use crate::model::rental::Rental;
use crate::model::EntityKind;
use crate::persistence::{DataResult, Persistence};
use crate::repo::entities::EntityRepositories;
use crate::repo::repository::Repository;
use log::{error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

type TaskOutcome = (EntityKind, Result<usize, LoadError>);

/// Thread pool used by the parallel strategy.
#[derive(Debug, Clone, Default)]
pub enum Scheduler {
    /// Process-wide rayon pool.
    #[default]
    Global,
    /// Caller-owned rayon pool.
    Pool(Arc<rayon::ThreadPool>),
}

impl Scheduler {
    /// Builds a dedicated pool with `threads` workers.
    pub fn dedicated(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("rental-parallel-{index}"))
            .build()?;
        Ok(Self::Pool(Arc::new(pool)))
    }

    fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R + Send,
        R: Send,
    {
        match self {
            Self::Global => rayon::scope(op),
            Self::Pool(pool) => pool.scope(op),
        }
    }
}

/// How the four startup collections are loaded.
#[derive(Debug, Clone)]
pub enum LoadingStrategy {
    /// One collection after another on the caller thread.
    Sequential,
    /// One task per collection on a shared scheduler, failures isolated.
    Parallel(Scheduler),
    /// One task per collection on a dedicated fixed-size worker pool.
    BoundedExecutor {
        pool_size: usize,
        shutdown_timeout: Duration,
    },
}

impl LoadingStrategy {
    /// Parallel loading on the global rayon pool.
    pub fn parallel() -> Self {
        Self::Parallel(Scheduler::Global)
    }

    /// Bounded executor with the default 60 second shutdown grace period.
    pub fn bounded_executor(pool_size: usize) -> Self {
        Self::BoundedExecutor {
            pool_size,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }

    pub fn bounded_from_config(config: &LoaderConfig) -> Self {
        Self::BoundedExecutor {
            pool_size: config.pool_size,
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel(_) => "parallel",
            Self::BoundedExecutor { .. } => "bounded_executor",
        }
    }

    pub(crate) fn run<P: Persistence>(
        &self,
        loader: &DataLoader<P>,
        repositories: &mut EntityRepositories,
    ) -> Result<LoadResult, LoadError> {
        match self {
            Self::Sequential => load_sequential(loader, repositories),
            Self::Parallel(scheduler) => Ok(load_parallel(loader, repositories, scheduler)),
            Self::BoundedExecutor {
                pool_size,
                shutdown_timeout,
            } => load_bounded(loader, repositories, *pool_size, *shutdown_timeout).result,
        }
    }
}

impl Default for LoadingStrategy {
    fn default() -> Self {
        Self::bounded_executor(DEFAULT_POOL_SIZE)
    }
}

fn load_sequential<P: Persistence>(
    loader: &DataLoader<P>,
    repositories: &mut EntityRepositories,
) -> Result<LoadResult, LoadError> {
    let started_at = Instant::now();
    let EntityRepositories {
        branches,
        cars,
        customers,
        rentals,
        ..
    } = repositories;

    let counts = load_in_order(loader, branches, cars, customers, rentals);

    match counts {
        Ok(counts) => {
            let result = LoadResult::from_counts(counts, started_at.elapsed());
            info!(
                "event=load_sequential module=loader status=ok duration_ms={}",
                result.duration_ms()
            );
            Ok(result)
        }
        Err(err) => {
            error!(
                "event=load_sequential module=loader status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn load_in_order<P: Persistence>(
    loader: &DataLoader<P>,
    branches: &mut Repository<Branch>,
    cars: &mut Repository<Car>,
    customers: &mut Repository<Customer>,
    rentals: &mut Repository<Rental>,
) -> Result<[usize; 4], LoadError> {
    Ok([
        fatal(EntityKind::Branches, loader.load_entity(EntityKind::Branches, branches))?,
        fatal(EntityKind::Cars, loader.load_entity(EntityKind::Cars, cars))?,
        fatal(EntityKind::Customers, loader.load_entity(EntityKind::Customers, customers))?,
        fatal(EntityKind::Rentals, loader.load_entity(EntityKind::Rentals, rentals))?,
    ])
}

fn load_parallel<P: Persistence>(
    loader: &DataLoader<P>,
    repositories: &mut EntityRepositories,
    scheduler: &Scheduler,
) -> LoadResult {
    let started_at = Instant::now();
    let EntityRepositories {
        branches,
        cars,
        customers,
        rentals,
        ..
    } = repositories;

    let mut counts = [0usize; 4];
    {
        let [branches_loaded, cars_loaded, customers_loaded, rentals_loaded] = &mut counts;
        scheduler.scope(move |scope| {
            scope.spawn(move |_| {
                *branches_loaded = isolated(EntityKind::Branches, || {
                    loader.load_entity(EntityKind::Branches, branches)
                });
            });
            scope.spawn(move |_| {
                *cars_loaded = isolated(EntityKind::Cars, || {
                    loader.load_entity(EntityKind::Cars, cars)
                });
            });
            scope.spawn(move |_| {
                *customers_loaded = isolated(EntityKind::Customers, || {
                    loader.load_entity(EntityKind::Customers, customers)
                });
            });
            scope.spawn(move |_| {
                *rentals_loaded = isolated(EntityKind::Rentals, || {
                    loader.load_entity(EntityKind::Rentals, rentals)
                });
            });
        });
    }

    // Measured after the scope joined every task.
    let result = LoadResult::from_counts(counts, started_at.elapsed());
    info!(
        "event=load_parallel module=loader status=ok duration_ms={}",
        result.duration_ms()
    );
    result
}

/// Outcome of a bounded-executor run together with the pool's final state.
#[derive(Debug)]
pub struct ExecutorRun {
    pub result: Result<LoadResult, LoadError>,
    pub pool_state: PoolState,
}

/// Runs the bounded-executor strategy and reports the pool's final state.
///
/// The pool is always shut down before this returns, including when a task
/// fails or a submission is rejected.
pub fn load_bounded<P: Persistence>(
    loader: &DataLoader<P>,
    repositories: &mut EntityRepositories,
    pool_size: usize,
    shutdown_timeout: Duration,
) -> ExecutorRun {
    let started_at = Instant::now();
    let EntityRepositories {
        branches,
        cars,
        customers,
        rentals,
        ..
    } = repositories;

    let (result, pool_state) = thread::scope(|scope| {
        let mut pool = match WorkerPool::start(scope, pool_size, shutdown_timeout) {
            Ok(pool) => pool,
            Err(err) => return (Err(LoadError::Pool(err)), PoolState::Terminated),
        };

        let (results_tx, results_rx) = mpsc::channel::<TaskOutcome>();
        let submitted = submit_load(&pool, &results_tx, EntityKind::Branches, move || {
            loader.load_entity(EntityKind::Branches, branches)
        })
        .and_then(|()| {
            submit_load(&pool, &results_tx, EntityKind::Cars, move || {
                loader.load_entity(EntityKind::Cars, cars)
            })
        })
        .and_then(|()| {
            submit_load(&pool, &results_tx, EntityKind::Customers, move || {
                loader.load_entity(EntityKind::Customers, customers)
            })
        })
        .and_then(|()| {
            submit_load(&pool, &results_tx, EntityKind::Rentals, move || {
                loader.load_entity(EntityKind::Rentals, rentals)
            })
        });
        drop(results_tx);

        let result = submitted
            .and_then(|()| await_all(&results_rx))
            .map(|counts| LoadResult::from_counts(counts, started_at.elapsed()));
        let pool_state = pool.shutdown();
        (result, pool_state)
    });

    match &result {
        Ok(load_result) => info!(
            "event=load_bounded module=loader status=ok pool_size={} pool_state={:?} duration_ms={}",
            pool_size,
            pool_state,
            load_result.duration_ms()
        ),
        Err(err) => error!(
            "event=load_bounded module=loader status=error pool_size={} pool_state={:?} duration_ms={} error={}",
            pool_size,
            pool_state,
            started_at.elapsed().as_millis(),
            err
        ),
    }

    ExecutorRun { result, pool_state }
}

fn submit_load<'scope, F>(
    pool: &WorkerPool<'scope>,
    results: &Sender<TaskOutcome>,
    entity: EntityKind,
    task: F,
) -> Result<(), LoadError>
where
    F: FnOnce() -> DataResult<usize> + Send + 'scope,
{
    let results = results.clone();
    pool.submit(move || {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(count)) => Ok(count),
            Ok(Err(source)) => Err(LoadError::DataAccess { entity, source }),
            Err(payload) => Err(LoadError::TaskPanicked {
                entity,
                message: panic_message(payload.as_ref()),
            }),
        };
        // The receiver only disappears if the run already gave up.
        let _ = results.send((entity, outcome));
    })
    .map_err(LoadError::Pool)
}

/// Barrier over the four task outcomes.
///
/// Waits for every task, then reports the first failure in collection order.
fn await_all(results: &Receiver<TaskOutcome>) -> Result<[usize; 4], LoadError> {
    let mut slots: [Option<Result<usize, LoadError>>; 4] = Default::default();
    for _ in 0..EntityKind::LOADABLE.len() {
        let Ok((entity, outcome)) = results.recv() else {
            break;
        };
        if let Some(index) = slot_of(entity) {
            slots[index] = Some(outcome);
        }
    }

    let mut counts = [0usize; 4];
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(Ok(count)) => counts[index] = count,
            Some(Err(err)) => return Err(err),
            None => return Err(LoadError::TaskLost(EntityKind::LOADABLE[index])),
        }
    }
    Ok(counts)
}

fn slot_of(entity: EntityKind) -> Option<usize> {
    EntityKind::LOADABLE.iter().position(|kind| *kind == entity)
}

fn fatal(entity: EntityKind, outcome: DataResult<usize>) -> Result<usize, LoadError> {
    outcome.map_err(|source| LoadError::DataAccess { entity, source })
}

/// Runs one parallel task, turning any failure into a zero count.
fn isolated<F>(entity: EntityKind, task: F) -> usize
where
    F: FnOnce() -> DataResult<usize>,
{
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(Ok(count)) => count,
        Ok(Err(err)) => {
            error!(
                "event=load_parallel_task module=loader status=error entity={} error={}",
                entity, err
            );
            0
        }
        Err(payload) => {
            error!(
                "event=load_parallel_task module=loader status=error entity={} reason=panic payload={}",
                entity,
                panic_message(payload.as_ref())
            );
            0
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
