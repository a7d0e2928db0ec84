use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use roster_core::{lock, DataResult, TaskError};
use roster_logging::{roster_debug, roster_error, roster_trace, roster_warn};
use tokio_util::sync::CancellationToken;

use crate::{on_callback_context, Dispatcher, Executor, ImmediateDispatcher, InlineExecutor};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

type SuccessCallback<T> = Box<dyn FnOnce(T) + Send>;
type ErrorCallback = Box<dyn FnOnce(TaskError) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

/// Type-erased view of a task, enough to cancel it.
pub trait Cancellable: Send + Sync {
    fn cancel(&self);
    /// True once no currently registered callback can fire any more:
    /// the task was cancelled, already delivered, or finished with no
    /// callback waiting for its outcome.
    fn is_settled(&self) -> bool;
}

/// Executor plus callback context, shared by everything that submits tasks.
#[derive(Clone)]
pub struct TaskRuntime {
    executor: Arc<dyn Executor>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl TaskRuntime {
    pub fn new(executor: Arc<dyn Executor>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            executor,
            dispatcher,
        }
    }

    /// Computations and callbacks both run synchronously on the caller.
    pub fn inline() -> Self {
        Self::new(Arc::new(InlineExecutor), Arc::new(ImmediateDispatcher))
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    /// Schedules `computation` on the executor and returns its handle without
    /// waiting. The computation gets the task's cancellation token as its
    /// interruption point.
    pub fn submit<T, F>(&self, computation: F) -> Task<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce(&CancellationToken) -> Result<T, TaskError> + Send + 'static,
    {
        let task = Task::new(Arc::clone(&self.dispatcher));
        roster_trace!("task #{} submitted", task.id());
        let inner = Arc::clone(&task.inner);
        self.executor.execute(Box::new(move || inner.run(computation)));
        task
    }
}

struct TaskState<T> {
    outcome: DataResult<T>,
    cancelled: bool,
    delivered: bool,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> TaskState<T> {
    fn status(&self) -> TaskStatus {
        match (&self.outcome, self.cancelled) {
            (DataResult::Success(_), _) => TaskStatus::Succeeded,
            (DataResult::Error(_), _) => TaskStatus::Failed,
            (_, true) => TaskStatus::Cancelled,
            _ => TaskStatus::Pending,
        }
    }

    /// A finished task whose delivery is still queued is not settled.
    fn settled(&self) -> bool {
        if self.cancelled || self.delivered {
            return true;
        }
        match &self.outcome {
            DataResult::Success(_) => self.on_success.is_none(),
            DataResult::Error(_) => self.on_error.is_none(),
            DataResult::Empty | DataResult::Pending => false,
        }
    }
}

enum Delivery<T> {
    Success(SuccessCallback<T>, T),
    Error(ErrorCallback, TaskError),
}

struct TaskInner<T> {
    id: u64,
    state: Mutex<TaskState<T>>,
    finished: Condvar,
    token: CancellationToken,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<T: Clone + Send + 'static> TaskInner<T> {
    fn run<F>(self: &Arc<Self>, computation: F)
    where
        F: FnOnce(&CancellationToken) -> Result<T, TaskError>,
    {
        if self.token.is_cancelled() {
            roster_trace!("task #{} cancelled before it started", self.id);
            return;
        }
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| computation(&self.token))) {
            Ok(Ok(value)) => DataResult::Success(value),
            Ok(Err(err)) => DataResult::Error(err),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                roster_error!("task #{} panicked: {}", self.id, message);
                DataResult::Error(TaskError::msg(format!("computation panicked: {message}")))
            }
        };
        self.complete(outcome);
    }

    fn complete(self: &Arc<Self>, outcome: DataResult<T>) {
        {
            let mut state = lock(&self.state);
            if state.cancelled {
                roster_trace!("task #{} finished after cancel; outcome dropped", self.id);
                return;
            }
            if let DataResult::Error(err) = &outcome {
                roster_warn!("task #{} failed: {}", self.id, err);
            } else {
                roster_trace!("task #{} succeeded", self.id);
            }
            state.outcome = outcome;
        }
        self.finished.notify_all();
        self.schedule_dispatch();
    }

    fn schedule_dispatch(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.dispatcher.post(Box::new(move || inner.deliver()));
    }

    /// Runs on the callback context. Hands the outcome to the matching
    /// callback at most once over the task's lifetime.
    fn deliver(&self) {
        let delivery = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            if state.cancelled || state.delivered {
                return;
            }
            let delivery = match &state.outcome {
                DataResult::Success(value) => state
                    .on_success
                    .take()
                    .map(|callback| Delivery::Success(callback, value.clone())),
                DataResult::Error(err) => state
                    .on_error
                    .take()
                    .map(|callback| Delivery::Error(callback, err.clone())),
                DataResult::Empty | DataResult::Pending => None,
            };
            if delivery.is_some() {
                state.delivered = true;
                state.on_success = None;
                state.on_error = None;
            }
            delivery
        };

        match delivery {
            Some(Delivery::Success(callback, value)) => callback(value),
            Some(Delivery::Error(callback, err)) => callback(err),
            None => {}
        }
    }
}

/// Handle to one asynchronous computation.
///
/// Holds at most one success and one error callback; registering another
/// replaces the previous one. Exactly one of them is invoked, once, on the
/// callback context, whether it was registered before or after the
/// computation finished. Cloning yields another handle to the same task.
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Task<T> {
    fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
                state: Mutex::new(TaskState {
                    outcome: DataResult::Pending,
                    cancelled: false,
                    delivered: false,
                    on_success: None,
                    on_error: None,
                }),
                finished: Condvar::new(),
                token: CancellationToken::new(),
                dispatcher,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn status(&self) -> TaskStatus {
        lock(&self.inner.state).status()
    }

    pub fn on_success(&self, callback: impl FnOnce(T) + Send + 'static) -> &Self {
        {
            let mut state = lock(&self.inner.state);
            if state.cancelled || state.delivered {
                return self;
            }
            state.on_success = Some(Box::new(callback));
        }
        self.inner.schedule_dispatch();
        self
    }

    pub fn on_error(&self, callback: impl FnOnce(TaskError) + Send + 'static) -> &Self {
        {
            let mut state = lock(&self.inner.state);
            if state.cancelled || state.delivered {
                return self;
            }
            state.on_error = Some(Box::new(callback));
        }
        self.inner.schedule_dispatch();
        self
    }

    /// Blocks until the task is terminal and returns its outcome.
    ///
    /// Must not be used on the callback context: a pending task is reported
    /// as a failure there instead of blocking the context forever.
    pub fn wait(&self) -> Result<T, TaskError> {
        let mut state = lock(&self.inner.state);
        if state.status() == TaskStatus::Pending && on_callback_context() {
            return Err(TaskError::msg(format!(
                "task #{} waited on from the callback context",
                self.inner.id
            )));
        }
        while state.status() == TaskStatus::Pending {
            state = self
                .inner
                .finished
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match &state.outcome {
            DataResult::Success(value) => Ok(value.clone()),
            DataResult::Error(err) => Err(err.clone()),
            DataResult::Empty | DataResult::Pending => Err(TaskError::Cancelled),
        }
    }

    /// Requests interruption and drops every current and future callback.
    /// Idempotent.
    pub fn cancel(&self) {
        let dropped = {
            let mut state = lock(&self.inner.state);
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            (state.on_success.take(), state.on_error.take())
        };
        drop(dropped);
        self.inner.token.cancel();
        self.inner.finished.notify_all();
        roster_debug!("task #{} cancelled", self.inner.id);
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.inner.state).cancelled
    }
}

impl<T: Clone + Send + 'static> Cancellable for Task<T> {
    fn cancel(&self) {
        Task::cancel(self);
    }

    fn is_settled(&self) -> bool {
        lock(&self.inner.state).settled()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
