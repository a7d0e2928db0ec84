//! Roster core: result algebra, entity types, one-shot events and the pure
//! list/details view-state machines.
mod details;
mod effect;
mod entity;
mod error;
mod event;
mod list;
mod msg;
mod observable;
mod result;
mod sync;
mod update;

pub use details::DetailsState;
pub use effect::{DetailsEffect, ListEffect, Notice};
pub use entity::{Entity, EntityId, SubscriptionId, User, UserDetails};
pub use error::TaskError;
pub use event::{Event, EventChannel};
pub use list::{ListItem, ListState};
pub use msg::{DetailsMsg, ListMsg, Operation};
pub use observable::Observable;
pub use result::DataResult;
pub use sync::lock;
pub use update::{update_details, update_list};
