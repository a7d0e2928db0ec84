use tokio::runtime::{Builder, Handle, Runtime};

use crate::{EngineError, PoolSettings};

/// A unit of work handed to an executor or dispatcher.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs task computations off the callback context.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Shared pool of worker threads backed by a tokio runtime.
///
/// Computations are blocking code, so they go through `spawn_blocking`; the
/// runtime caps the number of threads and queues the rest.
pub struct WorkerPool {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl WorkerPool {
    pub fn new(settings: &PoolSettings) -> Result<Self, EngineError> {
        if settings.worker_threads == 0 || settings.max_blocking_threads == 0 {
            return Err(EngineError::InvalidSettings(format!(
                "worker_threads={} max_blocking_threads={} must both be positive",
                settings.worker_threads, settings.max_blocking_threads
            )));
        }
        let runtime = Builder::new_multi_thread()
            .worker_threads(settings.worker_threads)
            .max_blocking_threads(settings.max_blocking_threads)
            .thread_name(settings.thread_name.clone())
            .build()?;
        roster_logging::roster_debug!(
            "worker pool started: workers={} max_blocking={}",
            settings.worker_threads,
            settings.max_blocking_threads
        );
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) {
        // The join handle is not needed: outcomes travel through the task.
        drop(self.handle.spawn_blocking(job));
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Do not wait for computations that ignore their cancellation token.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Runs each job immediately on the submitting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}
