//! Roster engine: tasks, worker pool, callback context, entity store and the
//! controllers that drive the core view-state machines.
mod config;
mod details_controller;
mod dispatcher;
mod error;
mod executor;
mod list_controller;
mod scope;
mod source;
mod store;
mod task;

pub use config::{PoolSettings, StoreSettings};
pub use details_controller::DetailsController;
pub use dispatcher::{on_callback_context, Dispatcher, EventLoop, ImmediateDispatcher};
pub use error::EngineError;
pub use executor::{Executor, InlineExecutor, Job, WorkerPool};
pub use list_controller::{ListController, ListView};
pub use scope::TaskScope;
pub use source::{pause, DataSource};
pub use store::EntityStore;
pub use task::{Cancellable, Task, TaskRuntime, TaskStatus};

pub use tokio_util::sync::CancellationToken;
