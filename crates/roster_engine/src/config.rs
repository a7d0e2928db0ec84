use std::time::Duration;

/// Worker pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Async worker threads driving the pool.
    pub worker_threads: usize,
    /// Upper bound on threads running computations at once. Further jobs
    /// queue until a thread frees up.
    pub max_blocking_threads: usize,
    pub thread_name: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            max_blocking_threads: 64,
            thread_name: "roster-worker".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreSettings {
    /// Simulated backend latency applied before every store operation.
    pub operation_latency: Duration,
}

impl StoreSettings {
    pub fn with_latency(operation_latency: Duration) -> Self {
        Self { operation_latency }
    }
}
