//! eventide-runtime
//!
//! Cooperative single-threaded async runtime primitives: a [`Scheduler`]
//! driving a current-thread [`tokio::runtime::Runtime`] plus
//! [`tokio::task::LocalSet`], and a [`TaskHandle`] wrapper for `!Send`
//! futures spawned onto it. There is no preemption and no additional worker
//! thread — suspension happens only at explicit await points (transport I/O,
//! awaiting another task, or an explicit yield), which is what lets the
//! language-server dispatcher reason about ordering without locks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;

/// Tuning knobs for a [`Scheduler`], forwarded to the queues built on top of
/// it (the dispatcher's outgoing FIFO, in particular) rather than to Tokio
/// itself, which does not expose a configurable ready-queue capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Capacity hint for the scheduler's ready queue.
    pub ready_queue_hint: usize,
    /// Capacity hint for a dispatcher's outgoing message queue.
    pub outgoing_queue_hint: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ready_queue_hint: 16,
            outgoing_queue_hint: 16,
        }
    }
}

/// Closed error taxonomy for runtime startup and task completion.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The underlying Tokio runtime could not be constructed.
    #[error("runtime failed to start: {0}")]
    StartupFailed(String),
    /// A spawned task was cancelled (its `JoinHandle` was aborted or the
    /// `LocalSet` driving it was dropped) before it completed.
    #[error("task was cancelled before completing")]
    TaskCancelled,
    /// A spawned task panicked.
    #[error("task panicked during execution")]
    TaskPanicked,
}

impl RuntimeError {
    /// Stable machine-readable tag, for logs and error responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StartupFailed(_) => "startup_failed",
            Self::TaskCancelled => "task_cancelled",
            Self::TaskPanicked => "task_panicked",
        }
    }
}

/// Owns the current-thread Tokio runtime a [`Scheduler::run`] call drives.
///
/// `Scheduler` itself holds no task queue — Tokio's `LocalSet` already is
/// one — it exists to give `run`/construction a named, documented home and
/// a place for [`RuntimeConfig`] to live.
pub struct Scheduler {
    runtime: tokio::runtime::Runtime,
    config: RuntimeConfig,
}

impl Scheduler {
    /// Build a scheduler backed by a fresh current-thread runtime.
    ///
    /// # Errors
    /// Returns [`RuntimeError::StartupFailed`] if the underlying Tokio
    /// runtime fails to construct (e.g. the process cannot create the
    /// driver's I/O/timer resources).
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| RuntimeError::StartupFailed(e.to_string()))?;
        Ok(Self { runtime, config })
    }

    /// The config this scheduler was built with.
    #[must_use]
    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Drive `main` to completion on a fresh [`tokio::task::LocalSet`],
    /// returning whatever it resolves to.
    ///
    /// Any `!Send` future spawned via [`spawn`] while `main` (or a task it
    /// spawned) is running lands on this same `LocalSet`.
    pub fn run<F: Future>(&self, main: F) -> F::Output {
        let local = tokio::task::LocalSet::new();
        local.block_on(&self.runtime, main)
    }
}

/// Enqueue a detached, `!Send` task onto the [`tokio::task::LocalSet`]
/// currently driving the calling future.
///
/// # Panics
/// Panics if called outside a [`Scheduler::run`] call (mirroring
/// `tokio::task::spawn_local`'s own contract) — every call site in this
/// crate family is itself inside the dispatcher's main loop, which always
/// runs under one.
pub fn spawn<F>(future: F) -> TaskHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    TaskHandle {
        inner: tokio::task::spawn_local(future),
    }
}

/// A thin wrapper over [`tokio::task::JoinHandle`] for a task spawned via
/// [`spawn`]. Awaiting it suspends the parent until the task completes;
/// Tokio's own waker wires the parent back up when that happens.
pub struct TaskHandle<T> {
    inner: tokio::task::JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// `true` once the task has completed (successfully, by panic, or by
    /// cancellation), without blocking.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Abort the task. The next poll of this handle (or of the task's own
    /// future, if still running) observes cancellation.
    pub fn abort(&self) {
        self.inner.abort();
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, RuntimeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // `tokio::task::JoinHandle` is `Unpin`, so projecting into it needs
        // no unsafe pin magic.
        Pin::new(&mut self.inner).poll(cx).map(|res| {
            res.map_err(|join_err| {
                if join_err.is_cancelled() {
                    RuntimeError::TaskCancelled
                } else {
                    RuntimeError::TaskPanicked
                }
            })
        })
    }
}
