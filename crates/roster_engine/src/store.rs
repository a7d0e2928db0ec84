use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use roster_core::{lock, Entity, EntityId, SubscriptionId, TaskError};
use roster_logging::{roster_debug, roster_trace};

use crate::{pause, DataSource, Dispatcher, StoreSettings, Task, TaskRuntime};

type Listener<E> = Arc<dyn Fn(&[E]) + Send + Sync>;

struct StoreState<E> {
    entities: Vec<E>,
    loaded: bool,
    version: u64,
}

/// A published sequence tagged with the mutation that produced it.
struct Snapshot<E> {
    version: u64,
    entities: Vec<E>,
}

impl<E: Clone> StoreState<E> {
    /// Records a mutation and returns the snapshot to publish; nothing is
    /// published before the first load.
    fn publishable(&mut self) -> Option<Snapshot<E>> {
        self.version += 1;
        self.loaded.then(|| Snapshot {
            version: self.version,
            entities: self.entities.clone(),
        })
    }
}

struct ListenerEntry<E> {
    id: SubscriptionId,
    /// Version of the newest snapshot this listener has received.
    seen: Arc<AtomicU64>,
    callback: Listener<E>,
}

struct Listeners<E> {
    entries: Vec<ListenerEntry<E>>,
    next_id: u64,
}

struct StoreShared<E> {
    state: Mutex<StoreState<E>>,
    listeners: Mutex<Listeners<E>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<E: Entity> StoreShared<E> {
    /// Posts `snapshot` to the callback context. Listeners are resolved when
    /// the job runs, so one removed in the meantime is not called.
    ///
    /// Workers post after releasing the state lock, so snapshots can reach
    /// the context out of order. Each listener skips a snapshot older than
    /// the newest one it has already received.
    fn notify(self: &Arc<Self>, snapshot: Snapshot<E>) {
        let shared = Arc::clone(self);
        self.dispatcher.post(Box::new(move || {
            let Snapshot { version, entities } = snapshot;
            let listeners: Vec<(Arc<AtomicU64>, Listener<E>)> = lock(&shared.listeners)
                .entries
                .iter()
                .map(|entry| (Arc::clone(&entry.seen), Arc::clone(&entry.callback)))
                .collect();
            roster_trace!(
                "store notifies {} listener(s) of {} entities (v{})",
                listeners.len(),
                entities.len(),
                version
            );
            for (seen, listener) in listeners {
                if seen.fetch_max(version, Ordering::AcqRel) >= version {
                    roster_trace!("store snapshot v{} superseded; skipped", version);
                    continue;
                }
                listener(entities.as_slice());
            }
        }));
    }
}

/// Authoritative in-memory ordered sequence of entities.
///
/// Every operation runs as a [`Task`] on the worker pool. Shared state is
/// only touched under its lock, and listeners receive full snapshots on the
/// callback context after the lock is released.
pub struct EntityStore<E, S> {
    runtime: TaskRuntime,
    source: Arc<S>,
    shared: Arc<StoreShared<E>>,
    settings: StoreSettings,
}

impl<E: Entity, S: DataSource<E>> EntityStore<E, S> {
    pub fn new(runtime: TaskRuntime, source: S, settings: StoreSettings) -> Self {
        let shared = Arc::new(StoreShared {
            state: Mutex::new(StoreState {
                entities: Vec::new(),
                loaded: false,
                version: 0,
            }),
            listeners: Mutex::new(Listeners {
                entries: Vec::new(),
                next_id: 0,
            }),
            dispatcher: Arc::clone(runtime.dispatcher()),
        });
        Self {
            runtime,
            source: Arc::new(source),
            shared,
            settings,
        }
    }

    /// Replaces the whole sequence with fresh data from the source.
    pub fn load(&self) -> Task<()> {
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let latency = self.settings.operation_latency;
        self.runtime.submit(move |cancel| {
            pause(latency, cancel)?;
            let entities = source.fetch_all(cancel)?;
            let snapshot = {
                let mut state = lock(&shared.state);
                state.entities = entities;
                state.loaded = true;
                state.publishable()
            };
            if let Some(snapshot) = snapshot {
                roster_debug!("store loaded {} entities", snapshot.entities.len());
                shared.notify(snapshot);
            }
            Ok(())
        })
    }

    /// Enriched projection of the entity with `id`; fails with `NotFound`
    /// if it is not in the current snapshot. Never mutates or notifies.
    pub fn get_by_id(&self, id: EntityId) -> Task<S::Details> {
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let latency = self.settings.operation_latency;
        self.runtime.submit(move |cancel| {
            pause(latency, cancel)?;
            let entity = lock(&shared.state)
                .entities
                .iter()
                .find(|entity| entity.id() == id)
                .cloned()
                .ok_or(TaskError::NotFound(id))?;
            source.details(&entity, cancel)
        })
    }

    /// Deletes the entity with `id`. Yields whether anything was removed;
    /// a missing id is not an error.
    pub fn remove(&self, id: EntityId) -> Task<bool> {
        let shared = Arc::clone(&self.shared);
        let latency = self.settings.operation_latency;
        self.runtime.submit(move |cancel| {
            pause(latency, cancel)?;
            let snapshot = {
                let mut state = lock(&shared.state);
                match state.entities.iter().position(|entity| entity.id() == id) {
                    Some(index) => {
                        state.entities.remove(index);
                        state.publishable()
                    }
                    None => return Ok(false),
                }
            };
            roster_debug!("store removed entity {}", id);
            if let Some(snapshot) = snapshot {
                shared.notify(snapshot);
            }
            Ok(true)
        })
    }

    /// Swaps the entity with `id` and the one `offset` positions away.
    /// Yields whether the sequence changed; an unknown id or a target
    /// outside the sequence leaves it untouched.
    pub fn move_by(&self, id: EntityId, offset: isize) -> Task<bool> {
        let shared = Arc::clone(&self.shared);
        let latency = self.settings.operation_latency;
        self.runtime.submit(move |cancel| {
            pause(latency, cancel)?;
            let snapshot = {
                let mut state = lock(&shared.state);
                let len = state.entities.len();
                let Some(from) = state.entities.iter().position(|entity| entity.id() == id) else {
                    return Ok(false);
                };
                let Some(to) = from.checked_add_signed(offset).filter(|to| *to < len) else {
                    return Ok(false);
                };
                if to == from {
                    return Ok(false);
                }
                state.entities.swap(from, to);
                state.publishable()
            };
            roster_debug!("store moved entity {} by {}", id, offset);
            if let Some(snapshot) = snapshot {
                shared.notify(snapshot);
            }
            Ok(true)
        })
    }

    /// Registers a change listener. If the store is loaded, `listener` is
    /// called with the current snapshot before this returns; snapshots
    /// queued before registration are never delivered to it.
    pub fn add_listener(
        &self,
        listener: impl Fn(&[E]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let listener: Listener<E> = Arc::new(listener);
        let (id, current) = {
            // Lock order: state, then listeners.
            let state = lock(&self.shared.state);
            let mut listeners = lock(&self.shared.listeners);
            listeners.next_id += 1;
            let id = SubscriptionId(listeners.next_id);
            listeners.entries.push(ListenerEntry {
                id,
                seen: Arc::new(AtomicU64::new(state.version)),
                callback: Arc::clone(&listener),
            });
            (id, state.loaded.then(|| state.entities.clone()))
        };
        if let Some(entities) = current {
            listener(entities.as_slice());
        }
        id
    }

    /// Returns false when `id` was not registered.
    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|entry| entry.id != id);
        listeners.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.shared.listeners).entries.len()
    }

    pub fn snapshot(&self) -> Vec<E> {
        lock(&self.shared.state).entities.clone()
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.shared.state).loaded
    }
}
