use std::fmt;

use crate::EntityId;

/// Transient user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LoadFailed,
    MoveFailed,
    DeleteFailed,
    DetailsFailed,
    Deleted,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed => write!(f, "Can't load the list"),
            Notice::MoveFailed => write!(f, "Can't move the item"),
            Notice::DeleteFailed => write!(f, "Can't delete the item"),
            Notice::DetailsFailed => write!(f, "Can't load details"),
            Notice::Deleted => write!(f, "Item has been deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    Load,
    Move { id: EntityId, by: isize },
    Delete { id: EntityId },
    Notify(Notice),
    OpenDetails { id: EntityId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsEffect {
    Fetch { id: EntityId },
    Delete { id: EntityId },
    Notify(Notice),
    GoBack,
}
