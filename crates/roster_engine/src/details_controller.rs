use std::sync::{Arc, Mutex};

use roster_core::{
    lock, update_details, DetailsEffect, DetailsMsg, DetailsState, Entity, EntityId, EventChannel,
    Notice, Observable,
};

use crate::{DataSource, EntityStore, TaskScope};

struct DetailsShared<E: Entity, S: DataSource<E>>
where
    S::Details: Entity,
{
    store: Arc<EntityStore<E, S>>,
    id: EntityId,
    state: Mutex<DetailsState<S::Details>>,
    view: Observable<DetailsState<S::Details>>,
    notices: EventChannel<Notice>,
    go_back: EventChannel<()>,
    scope: TaskScope,
}

impl<E: Entity, S: DataSource<E>> DetailsShared<E, S>
where
    S::Details: Entity,
{
    fn send(self: &Arc<Self>, msg: DetailsMsg<S::Details>) {
        let (view, effects) = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update_details(state, msg);
            let view = state.consume_dirty().then(|| state.clone());
            *guard = state;
            (view, effects)
        };

        if let Some(view) = view {
            self.view.set(view);
        }
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(self: &Arc<Self>, effect: DetailsEffect) {
        match effect {
            DetailsEffect::Fetch { id } => {
                let on_loaded = Arc::downgrade(self);
                let on_failed = on_loaded.clone();
                let task = self.store.get_by_id(id);
                task.on_success(move |details| {
                    if let Some(shared) = on_loaded.upgrade() {
                        shared.send(DetailsMsg::Loaded(details));
                    }
                })
                .on_error(move |err| {
                    if let Some(shared) = on_failed.upgrade() {
                        shared.send(DetailsMsg::LoadFailed(err));
                    }
                });
                self.scope.track(task);
            }
            DetailsEffect::Delete { id } => {
                let on_deleted = Arc::downgrade(self);
                let on_failed = on_deleted.clone();
                let task = self.store.remove(id);
                task.on_success(move |_| {
                    if let Some(shared) = on_deleted.upgrade() {
                        shared.send(DetailsMsg::Deleted);
                    }
                })
                .on_error(move |err| {
                    if let Some(shared) = on_failed.upgrade() {
                        shared.send(DetailsMsg::DeleteFailed(err));
                    }
                });
                self.scope.track(task);
            }
            DetailsEffect::Notify(notice) => self.notices.emit(notice),
            DetailsEffect::GoBack => self.go_back.emit(()),
        }
    }
}

/// Details screen controller for a single entity.
///
/// Dropping the controller cancels its outstanding tasks.
pub struct DetailsController<E: Entity, S: DataSource<E>>
where
    S::Details: Entity,
{
    shared: Arc<DetailsShared<E, S>>,
}

impl<E: Entity, S: DataSource<E>> DetailsController<E, S>
where
    S::Details: Entity,
{
    pub fn new(store: Arc<EntityStore<E, S>>, id: EntityId) -> Self {
        Self {
            shared: Arc::new(DetailsShared {
                store,
                id,
                state: Mutex::new(DetailsState::new()),
                view: Observable::new(DetailsState::new()),
                notices: EventChannel::new(),
                go_back: EventChannel::new(),
                scope: TaskScope::new(),
            }),
        }
    }

    pub fn id(&self) -> EntityId {
        self.shared.id
    }

    /// Loads the details unless they already loaded.
    pub fn start(&self) {
        if !self.shared.scope.is_torn_down() {
            self.shared.send(DetailsMsg::LoadRequested { id: self.shared.id });
        }
    }

    /// Deletes the entity once its details are shown.
    pub fn delete(&self) {
        if !self.shared.scope.is_torn_down() {
            self.shared.send(DetailsMsg::DeleteRequested);
        }
    }

    pub fn state(&self) -> &Observable<DetailsState<S::Details>> {
        &self.shared.view
    }

    pub fn notices(&self) -> &EventChannel<Notice> {
        &self.shared.notices
    }

    /// Fires when the screen should close.
    pub fn go_back(&self) -> &EventChannel<()> {
        &self.shared.go_back
    }

    pub fn teardown(&self) {
        self.shared.scope.teardown();
    }
}

impl<E: Entity, S: DataSource<E>> Drop for DetailsController<E, S>
where
    S::Details: Entity,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
