use std::thread;
use std::time::{Duration, Instant};

use roster_core::{Entity, TaskError};
use tokio_util::sync::CancellationToken;

/// Supplier of entity data for an [`EntityStore`](crate::EntityStore).
///
/// Both methods run on worker threads and may block; they should return
/// early once `cancel` fires.
pub trait DataSource<E: Entity>: Send + Sync + 'static {
    /// Enriched read-only projection of one entity.
    type Details: Clone + Send + 'static;

    /// Produces a fresh full sequence. Only called by `load`.
    fn fetch_all(&self, cancel: &CancellationToken) -> Result<Vec<E>, TaskError>;

    fn details(&self, entity: &E, cancel: &CancellationToken) -> Result<Self::Details, TaskError>;
}

const PAUSE_SLICE: Duration = Duration::from_millis(10);

/// Sleeps for `duration`, waking early with `Cancelled` if `cancel` fires.
pub fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), TaskError> {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }
        thread::sleep(remaining.min(PAUSE_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::pause;
    use roster_core::TaskError;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn pause_returns_after_duration() {
        let token = CancellationToken::new();
        assert!(pause(Duration::from_millis(5), &token).is_ok());
        assert!(pause(Duration::ZERO, &token).is_ok());
    }

    #[test]
    fn pause_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(pause(Duration::from_secs(60), &token), Err(TaskError::Cancelled));
    }
}
