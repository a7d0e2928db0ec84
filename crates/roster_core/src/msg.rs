use crate::{EntityId, TaskError};

/// Per-item operations guarded by the busy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Move,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListMsg<E> {
    /// Screen asked for a (re)load of the whole list.
    LoadRequested,
    /// Store published a new snapshot.
    EntitiesChanged(Vec<E>),
    /// The load task failed.
    LoadFailed(TaskError),
    /// User asked to move an entity by `by` positions.
    MoveRequested { id: EntityId, by: isize },
    /// User asked to delete an entity.
    DeleteRequested { id: EntityId },
    /// User selected an entity to see its details.
    DetailsRequested { id: EntityId },
    /// A per-item operation finished.
    OperationSucceeded { id: EntityId, op: Operation },
    /// A per-item operation failed.
    OperationFailed {
        id: EntityId,
        op: Operation,
        error: TaskError,
    },
    /// The owning scope went away; outstanding operations were cancelled.
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsMsg<D> {
    LoadRequested { id: EntityId },
    Loaded(D),
    LoadFailed(TaskError),
    DeleteRequested,
    Deleted,
    DeleteFailed(TaskError),
}
