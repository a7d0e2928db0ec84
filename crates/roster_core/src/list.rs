use std::collections::HashSet;

use crate::{DataResult, Entity, EntityId, TaskError};

/// An entity paired with whether an operation on it is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<E> {
    pub entity: E,
    pub in_progress: bool,
}

/// List screen state: the store's latest data merged with the busy set.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    entities: DataResult<Vec<E>>,
    busy: HashSet<EntityId>,
    dirty: bool,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            entities: DataResult::Empty,
            busy: HashSet::new(),
            dirty: false,
        }
    }
}

impl<E: Entity> ListState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &DataResult<Vec<E>> {
        &self.entities
    }

    pub fn view(&self) -> DataResult<Vec<ListItem<E>>> {
        self.entities.as_ref().map(|entities| {
            entities
                .iter()
                .map(|entity| ListItem {
                    in_progress: self.is_busy(entity.id()),
                    entity: entity.clone(),
                })
                .collect()
        })
    }

    pub fn is_busy(&self, id: EntityId) -> bool {
        self.busy.contains(&id)
    }

    pub fn busy_count(&self) -> usize {
        self.busy.len()
    }

    /// Marks `id` busy. Returns false, changing nothing, if it already was.
    pub fn begin_operation(&mut self, id: EntityId) -> bool {
        let inserted = self.busy.insert(id);
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    pub fn end_operation(&mut self, id: EntityId) -> bool {
        let removed = self.busy.remove(&id);
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn clear_busy(&mut self) {
        if !self.busy.is_empty() {
            self.busy.clear();
            self.dirty = true;
        }
    }

    pub(crate) fn set_pending(&mut self) {
        self.entities = DataResult::Pending;
        self.dirty = true;
    }

    pub(crate) fn set_entities(&mut self, entities: Vec<E>) {
        self.entities = DataResult::from_items(entities);
        self.dirty = true;
    }

    pub(crate) fn set_failed(&mut self, err: TaskError) {
        self.entities = DataResult::Error(err);
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and resets it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
