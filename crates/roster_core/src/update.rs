use crate::{
    DataResult, DetailsEffect, DetailsMsg, DetailsState, Entity, ListEffect, ListMsg, ListState,
    Notice, Operation,
};

/// Pure update function for the list screen: applies a message to state and
/// returns any effects.
pub fn update_list<E: Entity>(
    mut state: ListState<E>,
    msg: ListMsg<E>,
) -> (ListState<E>, Vec<ListEffect>) {
    let effects = match msg {
        ListMsg::LoadRequested => {
            state.set_pending();
            vec![ListEffect::Load]
        }
        ListMsg::EntitiesChanged(entities) => {
            state.set_entities(entities);
            Vec::new()
        }
        ListMsg::LoadFailed(err) => {
            state.set_failed(err);
            vec![ListEffect::Notify(Notice::LoadFailed)]
        }
        ListMsg::MoveRequested { id, by } => {
            // A second operation on a busy entity is dropped, not queued.
            if state.begin_operation(id) {
                vec![ListEffect::Move { id, by }]
            } else {
                Vec::new()
            }
        }
        ListMsg::DeleteRequested { id } => {
            if state.begin_operation(id) {
                vec![ListEffect::Delete { id }]
            } else {
                Vec::new()
            }
        }
        ListMsg::DetailsRequested { id } => vec![ListEffect::OpenDetails { id }],
        ListMsg::OperationSucceeded { id, .. } => {
            state.end_operation(id);
            Vec::new()
        }
        ListMsg::OperationFailed { id, op, .. } => {
            state.end_operation(id);
            let notice = match op {
                Operation::Move => Notice::MoveFailed,
                Operation::Delete => Notice::DeleteFailed,
            };
            vec![ListEffect::Notify(notice)]
        }
        ListMsg::TornDown => {
            state.clear_busy();
            Vec::new()
        }
    };

    (state, effects)
}

/// Pure update function for the details screen.
pub fn update_details<D: Entity>(
    mut state: DetailsState<D>,
    msg: DetailsMsg<D>,
) -> (DetailsState<D>, Vec<DetailsEffect>) {
    let effects = match msg {
        DetailsMsg::LoadRequested { id } => {
            if state.details().is_success() {
                return (state, Vec::new());
            }
            state.set_details(DataResult::Pending);
            vec![DetailsEffect::Fetch { id }]
        }
        DetailsMsg::Loaded(details) => {
            state.set_details(DataResult::Success(details));
            Vec::new()
        }
        DetailsMsg::LoadFailed(err) => {
            state.set_details(DataResult::Error(err));
            vec![
                DetailsEffect::Notify(Notice::DetailsFailed),
                DetailsEffect::GoBack,
            ]
        }
        DetailsMsg::DeleteRequested => {
            let target = state.details().success().map(Entity::id);
            match target {
                Some(id) if !state.is_deleting() => {
                    state.set_deleting(true);
                    vec![DetailsEffect::Delete { id }]
                }
                _ => Vec::new(),
            }
        }
        // The flag stays set: the screen is leaving.
        DetailsMsg::Deleted => vec![
            DetailsEffect::Notify(Notice::Deleted),
            DetailsEffect::GoBack,
        ],
        DetailsMsg::DeleteFailed(_) => {
            state.set_deleting(false);
            vec![DetailsEffect::Notify(Notice::DeleteFailed)]
        }
    };

    (state, effects)
}
