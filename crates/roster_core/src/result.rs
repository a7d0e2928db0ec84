use crate::TaskError;

/// Outcome of a unit of work as seen by its consumers.
///
/// Exactly one variant is active; transitions are driven from outside.
#[derive(Debug, Clone, PartialEq)]
pub enum DataResult<T> {
    /// Nothing has been computed yet, or the computation produced no data.
    Empty,
    /// A computation is in flight and has not produced data yet.
    Pending,
    /// The computation completed with a value.
    Success(T),
    /// The computation failed.
    Error(TaskError),
}

impl<T> Default for DataResult<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> DataResult<T> {
    /// Transforms the data of a `Success`; every other variant is carried
    /// over unchanged to the new type.
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> DataResult<R> {
        match self {
            Self::Success(data) => DataResult::Success(f(data)),
            Self::Empty => DataResult::Empty,
            Self::Pending => DataResult::Pending,
            Self::Error(err) => DataResult::Error(err),
        }
    }

    pub fn as_ref(&self) -> DataResult<&T> {
        match self {
            Self::Success(data) => DataResult::Success(data),
            Self::Empty => DataResult::Empty,
            Self::Pending => DataResult::Pending,
            Self::Error(err) => DataResult::Error(err.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// True once a computation has finished, either way.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<Result<T, TaskError>> {
        match self {
            Self::Success(data) => Some(Ok(data)),
            Self::Error(err) => Some(Err(err)),
            Self::Empty | Self::Pending => None,
        }
    }
}

impl<T> DataResult<Vec<T>> {
    /// An empty sequence is reported as `Empty`, never as an empty `Success`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Success(items)
        }
    }
}

impl<T> From<Result<T, TaskError>> for DataResult<T> {
    fn from(result: Result<T, TaskError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Error(err),
        }
    }
}
