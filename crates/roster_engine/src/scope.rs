use std::sync::Mutex;

use roster_core::lock;
use roster_logging::roster_debug;

use crate::{Cancellable, Task};

#[derive(Default)]
struct ScopeState {
    tasks: Vec<Box<dyn Cancellable>>,
    torn_down: bool,
}

/// Binds outstanding tasks to a consumer's lifetime.
///
/// Tearing the scope down cancels every tracked task, so none of their
/// callbacks runs afterwards. Dropping the scope tears it down.
#[derive(Default)]
pub struct TaskScope {
    state: Mutex<ScopeState>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` and hands it back. A task tracked after teardown is
    /// cancelled immediately.
    ///
    /// Register callbacks before tracking: a finished task with nothing
    /// registered counts as settled and may be dropped from the registry.
    pub fn track<T: Clone + Send + 'static>(&self, task: Task<T>) -> Task<T> {
        let mut state = lock(&self.state);
        if state.torn_down {
            drop(state);
            task.cancel();
            return task;
        }
        state.tasks.retain(|tracked| !tracked.is_settled());
        state.tasks.push(Box::new(task.clone()));
        task
    }

    /// Number of tracked tasks that may still deliver.
    pub fn len(&self) -> usize {
        lock(&self.state)
            .tasks
            .iter()
            .filter(|tracked| !tracked.is_settled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_torn_down(&self) -> bool {
        lock(&self.state).torn_down
    }

    /// Cancels every tracked task and clears the registry. Idempotent.
    pub fn teardown(&self) {
        let tasks = {
            let mut state = lock(&self.state);
            state.torn_down = true;
            std::mem::take(&mut state.tasks)
        };
        if !tasks.is_empty() {
            roster_debug!("scope teardown cancels {} task(s)", tasks.len());
        }
        for task in tasks {
            task.cancel();
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.teardown();
    }
}
