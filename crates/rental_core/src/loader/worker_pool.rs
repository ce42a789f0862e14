//! Fixed-size scoped worker pool with an explicit shutdown lifecycle.
//!
//! # Responsibility
//! - Run submitted jobs on a bounded number of named worker threads.
//! - Drive the `Created -> Running -> ShutdownRequested -> Terminated |
//!   ForcedTerminated` state machine.
//!
//! # Invariants
//! - Workers are spawned on a `std::thread::Scope`, so jobs may borrow from
//!   the caller and every worker is joined before the scope returns.
//! - Shutdown is idempotent and also runs on drop.
//! - After a forced termination, queued jobs are discarded; a job that is
//!   already running cannot be preempted and runs to completion.
//! - A panicking job never takes its worker down.

use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, Scope};
use std::time::{Duration, Instant};

const WORKER_NAME_PREFIX: &str = "rental-loader";

type Job<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Lifecycle state of a [`WorkerPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Created,
    Running,
    ShutdownRequested,
    Terminated,
    ForcedTerminated,
}

impl PoolState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated | Self::ForcedTerminated)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::ShutdownRequested => "shutdown_requested",
            Self::Terminated => "terminated",
            Self::ForcedTerminated => "forced_terminated",
        }
    }
}

#[derive(Debug)]
pub enum PoolError {
    InvalidSize(usize),
    Spawn(std::io::Error),
    NotAccepting(PoolState),
}

impl Display for PoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSize(size) => write!(f, "worker pool size must be at least 1, got {size}"),
            Self::Spawn(err) => write!(f, "failed to spawn worker thread: {err}"),
            Self::NotAccepting(state) => {
                write!(f, "worker pool is not accepting jobs (state {})", state.as_str())
            }
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::InvalidSize(_) | Self::NotAccepting(_) => None,
        }
    }
}

struct PoolShared {
    state: Mutex<PoolState>,
    live_workers: Mutex<usize>,
    workers_done: Condvar,
    cancelled: AtomicBool,
    discarded: AtomicUsize,
}

/// Bounded pool of scoped worker threads.
pub struct WorkerPool<'scope> {
    size: usize,
    shutdown_timeout: Duration,
    sender: Option<Sender<Job<'scope>>>,
    shared: Arc<PoolShared>,
}

impl<'scope> WorkerPool<'scope> {
    /// Spawns `size` workers on `scope` and returns a running pool.
    ///
    /// `shutdown_timeout` is the grace period [`WorkerPool::shutdown`] waits
    /// for queued and running jobs before forcing termination.
    ///
    /// # Errors
    /// - `InvalidSize` when `size == 0`.
    /// - `Spawn` when the OS refuses a thread; already spawned workers exit.
    pub fn start<'env>(
        scope: &'scope Scope<'scope, 'env>,
        size: usize,
        shutdown_timeout: Duration,
    ) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::InvalidSize(size));
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState::Created),
            live_workers: Mutex::new(0),
            workers_done: Condvar::new(),
            cancelled: AtomicBool::new(false),
            discarded: AtomicUsize::new(0),
        });
        let (sender, receiver) = mpsc::channel::<Job<'scope>>();
        let receiver = Arc::new(Mutex::new(receiver));

        for index in 0..size {
            let worker_receiver = Arc::clone(&receiver);
            let worker_shared = Arc::clone(&shared);
            *shared.live_workers.lock() += 1;

            let spawned = thread::Builder::new()
                .name(format!("{WORKER_NAME_PREFIX}-{index}"))
                .spawn_scoped(scope, move || worker_loop(&worker_receiver, &worker_shared));

            if let Err(err) = spawned {
                *shared.live_workers.lock() -= 1;
                // Closing the queue lets the workers spawned so far exit.
                drop(sender);
                *shared.state.lock() = PoolState::Terminated;
                error!(
                    "event=pool_start module=loader status=error size={} spawned={} error={}",
                    size, index, err
                );
                return Err(PoolError::Spawn(err));
            }
        }

        *shared.state.lock() = PoolState::Running;
        info!(
            "event=pool_start module=loader status=ok size={} shutdown_timeout_ms={}",
            size,
            shutdown_timeout.as_millis()
        );

        Ok(Self {
            size,
            shutdown_timeout,
            sender: Some(sender),
            shared,
        })
    }

    pub fn state(&self) -> PoolState {
        *self.shared.state.lock()
    }

    /// Queues `job` for execution on the next free worker.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'scope,
    {
        let state = self.state();
        let sender = match (&self.sender, state) {
            (Some(sender), PoolState::Running) => sender,
            _ => return Err(PoolError::NotAccepting(state)),
        };
        sender
            .send(Box::new(job))
            .map_err(|_| PoolError::NotAccepting(self.state()))
    }

    /// Stops accepting jobs and waits up to the grace period for workers.
    ///
    /// Returns `Terminated` when every worker exited in time, otherwise marks
    /// the pool cancelled and returns `ForcedTerminated`. Calling this again
    /// returns the terminal state reached first.
    pub fn shutdown(&mut self) -> PoolState {
        {
            let mut state = self.shared.state.lock();
            if state.is_terminal() {
                return *state;
            }
            *state = PoolState::ShutdownRequested;
        }
        debug!("event=pool_shutdown module=loader status=start size={}", self.size);

        // Dropping the sender closes the queue once the backlog drains.
        self.sender.take();

        let started_at = Instant::now();
        let deadline = started_at + self.shutdown_timeout;
        let mut live = self.shared.live_workers.lock();
        while *live > 0 {
            if self
                .shared
                .workers_done
                .wait_until(&mut live, deadline)
                .timed_out()
            {
                break;
            }
        }
        let outstanding = *live;
        drop(live);

        let final_state = if outstanding == 0 {
            PoolState::Terminated
        } else {
            self.shared.cancelled.store(true, Ordering::Release);
            PoolState::ForcedTerminated
        };
        *self.shared.state.lock() = final_state;

        if final_state == PoolState::Terminated {
            info!(
                "event=pool_shutdown module=loader status=ok state={} duration_ms={}",
                final_state.as_str(),
                started_at.elapsed().as_millis()
            );
        } else {
            warn!(
                "event=pool_shutdown module=loader status=warn state={} outstanding_workers={} timeout_ms={}",
                final_state.as_str(),
                outstanding,
                self.shutdown_timeout.as_millis()
            );
        }
        final_state
    }
}

impl Drop for WorkerPool<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<'scope>(receiver: &Mutex<Receiver<Job<'scope>>>, shared: &PoolShared) {
    loop {
        let next = receiver.lock().recv();
        let Ok(job) = next else {
            break;
        };

        if shared.cancelled.load(Ordering::Acquire) {
            shared.discarded.fetch_add(1, Ordering::AcqRel);
            continue;
        }

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!(
                "event=pool_job module=loader status=error reason=panic worker={}",
                thread::current().name().unwrap_or("unnamed")
            );
        }
    }

    let mut live = shared.live_workers.lock();
    *live -= 1;
    if *live == 0 {
        shared.workers_done.notify_all();
    }
}
