//! Runs the list state machine against an [`EntityStore`].
//!
//! Messages arrive from the presentation layer and from task callbacks and
//! store notifications, which all run on the callback context. Each message
//! goes through [`update_list`]; the resulting view is published and the
//! effects are turned into store tasks tracked by the controller's scope.

use std::sync::{Arc, Mutex, Weak};

use roster_core::{
    lock, update_list, DataResult, Entity, EntityId, EventChannel, ListEffect, ListItem, ListMsg,
    ListState, Notice, Observable, Operation, SubscriptionId,
};
use roster_logging::roster_debug;

use crate::{DataSource, EntityStore, Task, TaskScope};

/// What the list screen renders.
pub type ListView<E> = DataResult<Vec<ListItem<E>>>;

struct ListShared<E: Entity, S: DataSource<E>> {
    store: Arc<EntityStore<E, S>>,
    state: Mutex<ListState<E>>,
    items: Observable<ListView<E>>,
    notices: EventChannel<Notice>,
    open_details: EventChannel<EntityId>,
    scope: TaskScope,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl<E: Entity, S: DataSource<E>> ListShared<E, S> {
    fn send(self: &Arc<Self>, msg: ListMsg<E>) {
        let (view, effects) = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update_list(state, msg);
            let view = state.consume_dirty().then(|| state.view());
            *guard = state;
            (view, effects)
        };

        if let Some(view) = view {
            self.items.set(view);
        }
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(self: &Arc<Self>, effect: ListEffect) {
        match effect {
            ListEffect::Load => {
                let weak = Arc::downgrade(self);
                let task = self.store.load();
                task.on_error(move |err| {
                    if let Some(shared) = weak.upgrade() {
                        shared.send(ListMsg::LoadFailed(err));
                    }
                });
                self.scope.track(task);
            }
            ListEffect::Move { id, by } => {
                self.track_operation(self.store.move_by(id, by), id, Operation::Move);
            }
            ListEffect::Delete { id } => {
                self.track_operation(self.store.remove(id), id, Operation::Delete);
            }
            ListEffect::Notify(notice) => self.notices.emit(notice),
            ListEffect::OpenDetails { id } => self.open_details.emit(id),
        }
    }

    fn track_operation(self: &Arc<Self>, task: Task<bool>, id: EntityId, op: Operation) {
        let on_done: Weak<Self> = Arc::downgrade(self);
        let on_failed = on_done.clone();
        task.on_success(move |_| {
            if let Some(shared) = on_done.upgrade() {
                shared.send(ListMsg::OperationSucceeded { id, op });
            }
        })
        .on_error(move |error| {
            if let Some(shared) = on_failed.upgrade() {
                shared.send(ListMsg::OperationFailed { id, op, error });
            }
        });
        self.scope.track(task);
    }
}

/// List screen controller: store data plus per-item progress.
///
/// Dropping the controller tears it down.
pub struct ListController<E: Entity, S: DataSource<E>> {
    shared: Arc<ListShared<E, S>>,
}

impl<E: Entity, S: DataSource<E>> ListController<E, S> {
    /// Creates an idle controller; call [`start`](Self::start) to subscribe
    /// and load.
    pub fn new(store: Arc<EntityStore<E, S>>) -> Self {
        Self {
            shared: Arc::new(ListShared {
                store,
                state: Mutex::new(ListState::new()),
                items: Observable::new(DataResult::Empty),
                notices: EventChannel::new(),
                open_details: EventChannel::new(),
                scope: TaskScope::new(),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Subscribes to the store and starts a load. Later calls do nothing.
    pub fn start(&self) {
        {
            let mut subscription = lock(&self.shared.subscription);
            if subscription.is_some() || self.shared.scope.is_torn_down() {
                return;
            }
            let weak = Arc::downgrade(&self.shared);
            *subscription = Some(self.shared.store.add_listener(move |entities| {
                if let Some(shared) = weak.upgrade() {
                    shared.send(ListMsg::EntitiesChanged(entities.to_vec()));
                }
            }));
        }
        self.shared.send(ListMsg::LoadRequested);
    }

    pub fn reload(&self) {
        self.intent(ListMsg::LoadRequested);
    }

    /// Ignored while another operation on `id` is in flight.
    pub fn on_move(&self, id: EntityId, by: isize) {
        if self.is_busy(id) {
            roster_debug!("entity {} busy; move ignored", id);
            return;
        }
        self.intent(ListMsg::MoveRequested { id, by });
    }

    /// Ignored while another operation on `id` is in flight.
    pub fn on_delete(&self, id: EntityId) {
        if self.is_busy(id) {
            roster_debug!("entity {} busy; delete ignored", id);
            return;
        }
        self.intent(ListMsg::DeleteRequested { id });
    }

    pub fn on_details(&self, id: EntityId) {
        self.intent(ListMsg::DetailsRequested { id });
    }

    pub fn is_busy(&self, id: EntityId) -> bool {
        lock(&self.shared.state).is_busy(id)
    }

    pub fn items(&self) -> &Observable<ListView<E>> {
        &self.shared.items
    }

    /// Transient messages for the user.
    pub fn notices(&self) -> &EventChannel<Notice> {
        &self.shared.notices
    }

    /// Requests to navigate to an entity's details.
    pub fn details_requests(&self) -> &EventChannel<EntityId> {
        &self.shared.open_details
    }

    /// Unsubscribes from the store and cancels every outstanding task; no
    /// callback of this controller runs afterwards. Idempotent.
    pub fn teardown(&self) {
        if let Some(id) = lock(&self.shared.subscription).take() {
            self.shared.store.remove_listener(id);
        }
        self.shared.scope.teardown();
        self.shared.send(ListMsg::TornDown);
    }

    fn intent(&self, msg: ListMsg<E>) {
        if self.shared.scope.is_torn_down() {
            roster_debug!("list controller torn down; intent ignored");
            return;
        }
        self.shared.send(msg);
    }
}

impl<E: Entity, S: DataSource<E>> Drop for ListController<E, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
