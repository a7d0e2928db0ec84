use std::sync::{Arc, Mutex, Once};

use pretty_assertions::assert_eq;
use roster_core::{DataResult, Notice, TaskError, User, UserDetails};
use roster_engine::{
    CancellationToken, DataSource, DetailsController, EntityStore, EventLoop, Executor,
    ImmediateDispatcher, InlineExecutor, Job, ListController, StoreSettings, TaskRuntime,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(roster_logging::initialize_for_tests);
}

#[derive(Default)]
struct ManualExecutor {
    jobs: Mutex<Vec<Job>>,
}

impl ManualExecutor {
    fn run_all(&self) {
        let jobs: Vec<Job> = std::mem::take(&mut *self.jobs.lock().unwrap());
        for job in jobs {
            job();
        }
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, job: Job) {
        self.jobs.lock().unwrap().push(job);
    }
}

struct Directory {
    users: Vec<User>,
}

impl DataSource<User> for Directory {
    type Details = UserDetails;

    fn fetch_all(&self, _cancel: &CancellationToken) -> Result<Vec<User>, TaskError> {
        Ok(self.users.clone())
    }

    fn details(&self, user: &User, _cancel: &CancellationToken) -> Result<UserDetails, TaskError> {
        Ok(UserDetails {
            user: user.clone(),
            details: format!("{} works at {}", user.name, user.company),
        })
    }
}

fn directory() -> Directory {
    Directory {
        users: [(1, "Ada", "Analytical"), (2, "Grace", "Navy"), (3, "Linus", "Transmeta")]
            .into_iter()
            .map(|(id, name, company)| User {
                id,
                name: name.to_string(),
                company: company.to_string(),
                photo: String::new(),
            })
            .collect(),
    }
}

fn inline_store() -> Arc<EntityStore<User, Directory>> {
    let store = Arc::new(EntityStore::new(
        TaskRuntime::inline(),
        directory(),
        StoreSettings::default(),
    ));
    store.load().wait().unwrap();
    store
}

fn collect<T: Clone + Send + 'static>(
    channel: &roster_core::EventChannel<T>,
) -> Arc<Mutex<Vec<T>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    channel.attach(move |value| sink.lock().unwrap().push(value));
    seen
}

#[test]
fn loads_details_through_pending() {
    init_logging();
    let controller = DetailsController::new(inline_store(), 2);
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    controller.state().observe(move |state| {
        sink.lock()
            .unwrap()
            .push((state.show_progress(), state.show_content()))
    });

    controller.start();
    controller.start();

    assert_eq!(
        *progress.lock().unwrap(),
        vec![(false, false), (true, false), (false, true)]
    );
    let state = controller.state().get();
    let details = state.details().success().cloned().unwrap();
    assert_eq!(details.details, "Grace works at Navy");
    assert!(state.enable_delete());
}

#[test]
fn missing_entity_reports_and_navigates_back() {
    init_logging();
    let controller = DetailsController::new(inline_store(), 42);
    let notices = collect(controller.notices());
    let back = collect(controller.go_back());

    controller.start();

    assert_eq!(
        *controller.state().get().details(),
        DataResult::Error(TaskError::NotFound(42))
    );
    assert_eq!(*notices.lock().unwrap(), vec![Notice::DetailsFailed]);
    assert_eq!(back.lock().unwrap().len(), 1);
}

#[test]
fn delete_removes_entity_and_updates_the_list() {
    init_logging();
    let store = inline_store();
    let list = ListController::new(Arc::clone(&store));
    list.start();

    let controller = DetailsController::new(Arc::clone(&store), 1);
    let notices = collect(controller.notices());
    let back = collect(controller.go_back());
    controller.start();
    controller.delete();

    assert_eq!(*notices.lock().unwrap(), vec![Notice::Deleted]);
    assert_eq!(back.lock().unwrap().len(), 1);
    assert!(controller.state().get().is_deleting());
    assert!(!controller.state().get().enable_delete());

    let remaining: Vec<u64> = list
        .items()
        .get()
        .success()
        .map(|items| items.iter().map(|item| item.entity.id).collect())
        .unwrap_or_default();
    assert_eq!(remaining, vec![2, 3]);
}

#[test]
fn delete_before_details_load_does_nothing() {
    init_logging();
    let store = inline_store();
    let controller = DetailsController::new(Arc::clone(&store), 3);

    controller.delete();

    assert!(!controller.state().get().is_deleting());
    assert_eq!(store.snapshot().len(), 3);
}

#[test]
fn teardown_drops_pending_fetch() {
    init_logging();
    let executor = Arc::new(ManualExecutor::default());
    let store = Arc::new(EntityStore::new(
        TaskRuntime::new(executor.clone(), Arc::new(ImmediateDispatcher)),
        directory(),
        StoreSettings::default(),
    ));
    store.load();
    executor.run_all();

    let controller = DetailsController::new(Arc::clone(&store), 1);
    controller.start();
    assert!(controller.state().get().details().is_pending());

    controller.teardown();
    executor.run_all();

    assert!(controller.state().get().details().is_pending());
    controller.start();
    executor.run_all();
    assert!(controller.state().get().details().is_pending());
}

#[test]
fn teardown_drops_fetch_waiting_for_delivery() {
    init_logging();
    let event_loop = Arc::new(EventLoop::new());
    let store = Arc::new(EntityStore::new(
        TaskRuntime::new(Arc::new(InlineExecutor), event_loop.clone()),
        directory(),
        StoreSettings::default(),
    ));
    store.load();
    event_loop.run_pending();

    let controller = DetailsController::new(Arc::clone(&store), 2);
    let notices = collect(controller.notices());
    controller.start();
    controller.start();
    assert!(controller.state().get().details().is_pending());

    controller.teardown();
    event_loop.run_pending();

    assert!(controller.state().get().details().is_pending());
    assert!(notices.lock().unwrap().is_empty());
}
