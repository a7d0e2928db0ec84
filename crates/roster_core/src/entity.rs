use std::fmt;

/// Stable identity of an entity.
pub type EntityId = u64;

/// An immutable record with a stable identity.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> EntityId;
}

/// Handle returned when registering a listener or observer; used to
/// deregister it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub company: String,
    /// Photo URL.
    pub photo: String,
}

impl Entity for User {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Read-only projection of a [`User`] enriched with descriptive text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub user: User,
    pub details: String,
}

impl Entity for UserDetails {
    fn id(&self) -> EntityId {
        self.user.id
    }
}
