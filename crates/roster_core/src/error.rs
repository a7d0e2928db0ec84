use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::EntityId;

/// Failure of a unit of work.
///
/// Cloneable so one terminal outcome can be handed to a callback and to a
/// blocking waiter alike.
#[derive(Clone, Error)]
pub enum TaskError {
    /// Lookup by identity missed.
    #[error("entity {0} not found")]
    NotFound(EntityId),
    /// The computation failed; carries the causing fault.
    #[error("operation failed: {0:#}")]
    OperationFailed(Arc<anyhow::Error>),
    /// The task was cancelled before producing an outcome.
    #[error("task cancelled")]
    Cancelled,
}

impl TaskError {
    pub fn failed(err: impl Into<anyhow::Error>) -> Self {
        Self::OperationFailed(Arc::new(err.into()))
    }

    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::OperationFailed(Arc::new(anyhow::Error::msg(message)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::OperationFailed(Arc::new(err))
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => f.debug_tuple("NotFound").field(id).finish(),
            Self::OperationFailed(err) => {
                f.debug_tuple("OperationFailed").field(&format_args!("{err:#}")).finish()
            }
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

// Causes have no equality of their own; two failures are equal when they
// render the same.
impl PartialEq for TaskError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::OperationFailed(a), Self::OperationFailed(b)) => {
                Arc::ptr_eq(a, b) || format!("{a:#}") == format!("{b:#}")
            }
            (Self::Cancelled, Self::Cancelled) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskError;

    #[test]
    fn display_includes_cause_chain() {
        let err = TaskError::failed(anyhow::anyhow!("disk gone").context("saving user"));
        assert_eq!(err.to_string(), "operation failed: saving user: disk gone");
    }

    #[test]
    fn failures_compare_by_message() {
        assert_eq!(TaskError::msg("boom"), TaskError::msg("boom"));
        assert_ne!(TaskError::msg("boom"), TaskError::Cancelled);
        assert_eq!(TaskError::NotFound(3), TaskError::NotFound(3));
    }
}
