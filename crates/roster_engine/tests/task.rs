use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, Once};
use std::thread;
use std::time::Duration;

use roster_core::TaskError;
use roster_engine::{
    on_callback_context, Dispatcher, EventLoop, Executor, ImmediateDispatcher, Job, PoolSettings,
    TaskRuntime, TaskStatus, WorkerPool,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(roster_logging::initialize_for_tests);
}

/// Holds submitted jobs until the test releases them.
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

fn manual_runtime() -> (Arc<ManualExecutor>, TaskRuntime) {
    let executor = Arc::new(ManualExecutor::default());
    let runtime = TaskRuntime::new(executor.clone(), Arc::new(ImmediateDispatcher));
    (executor, runtime)
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[test]
fn result_available_before_subscribe_is_delivered_once() {
    init_logging();
    let runtime = TaskRuntime::inline();
    let task = runtime.submit(|_| Ok(21 * 2));
    assert_eq!(task.status(), TaskStatus::Succeeded);

    let got = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&got);
    task.on_success(move |v| sink.lock().unwrap().push(v));

    // Nothing is delivered a second time, not even to a new callback.
    let late = counter();
    let hits = Arc::clone(&late);
    task.on_success(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(*got.lock().unwrap(), vec![42]);
    assert_eq!(late.load(Ordering::SeqCst), 0);
}

#[test]
fn subscribe_before_completion_is_delivered_on_completion() {
    init_logging();
    let (executor, runtime) = manual_runtime();
    let task = runtime.submit(|_| Ok("done".to_string()));

    let successes = counter();
    let errors = counter();
    let s = Arc::clone(&successes);
    let e = Arc::clone(&errors);
    task.on_success(move |v| {
        assert_eq!(v, "done");
        s.fetch_add(1, Ordering::SeqCst);
    })
    .on_error(move |_| {
        e.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(successes.load(Ordering::SeqCst), 0);

    executor.run_all();

    assert_eq!(task.status(), TaskStatus::Succeeded);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[test]
fn failure_goes_to_error_callback_only() {
    init_logging();
    let runtime = TaskRuntime::inline();
    let task = runtime.submit::<u8, _>(|_| Err(TaskError::NotFound(99)));

    let successes = counter();
    let s = Arc::clone(&successes);
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    task.on_success(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    })
    .on_error(move |err| *sink.lock().unwrap() = Some(err));

    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(*seen.lock().unwrap(), Some(TaskError::NotFound(99)));
    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(task.wait(), Err(TaskError::NotFound(99)));
}

#[test]
fn registering_again_replaces_the_previous_callback() {
    init_logging();
    let (executor, runtime) = manual_runtime();
    let task = runtime.submit(|_| Ok(()));

    let first = counter();
    let second = counter();
    let f = Arc::clone(&first);
    let s = Arc::clone(&second);
    task.on_success(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    task.on_success(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });
    executor.run_all();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_before_run_skips_computation_and_callbacks() {
    init_logging();
    let (executor, runtime) = manual_runtime();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let task = runtime.submit(move |_| {
        flag.store(true, Ordering::SeqCst);
        Ok(1)
    });

    let calls = counter();
    let c1 = Arc::clone(&calls);
    let c2 = Arc::clone(&calls);
    task.on_success(move |_| {
        c1.fetch_add(1, Ordering::SeqCst);
    })
    .on_error(move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    task.cancel();
    task.cancel();
    executor.run_all();

    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(task.status(), TaskStatus::Cancelled);
    assert_eq!(task.wait(), Err(TaskError::Cancelled));
}

#[test]
fn cancel_while_running_suppresses_delivery() {
    init_logging();
    let pool = Arc::new(WorkerPool::new(&PoolSettings::default()).unwrap());
    let event_loop = Arc::new(EventLoop::new());
    let runtime = TaskRuntime::new(pool, event_loop.clone());

    let (started_tx, started_rx) = mpsc::channel();
    let (finished_tx, finished_rx) = mpsc::channel();
    let task = runtime.submit(move |cancel| {
        started_tx.send(()).unwrap();
        while !cancel.is_cancelled() {
            thread::sleep(Duration::from_millis(1));
        }
        finished_tx.send(()).unwrap();
        Ok(7)
    });
    let calls = counter();
    let c1 = Arc::clone(&calls);
    let c2 = Arc::clone(&calls);
    task.on_success(move |_| {
        c1.fetch_add(1, Ordering::SeqCst);
    })
    .on_error(move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    task.cancel();
    finished_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    event_loop.run_for(Duration::from_millis(50));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(task.status(), TaskStatus::Cancelled);
}

#[test]
fn panic_in_computation_becomes_failure() {
    init_logging();
    let runtime = TaskRuntime::inline();
    let task = runtime.submit::<(), _>(|_| panic!("exploded"));

    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    task.on_error(move |err| *sink.lock().unwrap() = Some(err.to_string()));

    let message = seen.lock().unwrap().clone().unwrap();
    assert!(message.contains("exploded"), "{message}");
    assert_eq!(task.status(), TaskStatus::Failed);
}

#[test]
fn wait_blocks_until_worker_finishes() {
    init_logging();
    let pool = Arc::new(WorkerPool::new(&PoolSettings::default()).unwrap());
    let runtime = TaskRuntime::new(pool, Arc::new(EventLoop::new()));

    let (go_tx, go_rx) = mpsc::channel::<()>();
    let task = runtime.submit(move |_| {
        go_rx.recv().map_err(TaskError::failed)?;
        Ok(vec![1, 2, 3])
    });
    let failing = runtime.submit::<(), _>(|_| Err(TaskError::msg("backend down")));

    go_tx.send(()).unwrap();
    assert_eq!(task.wait(), Ok(vec![1, 2, 3]));
    assert_eq!(failing.wait(), Err(TaskError::msg("backend down")));
}

#[test]
fn wait_on_callback_context_fails_instead_of_blocking() {
    init_logging();
    let (executor, runtime) = manual_runtime();
    let task = runtime.submit(|_| Ok(5));

    let outcome = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&outcome);
    let waiting = task.clone();
    ImmediateDispatcher.post(Box::new(move || {
        *sink.lock().unwrap() = Some(waiting.wait());
    }));
    assert!(matches!(
        *outcome.lock().unwrap(),
        Some(Err(TaskError::OperationFailed(_)))
    ));

    executor.run_all();
    assert_eq!(task.wait(), Ok(5));
}

#[test]
fn callbacks_run_on_the_thread_draining_the_event_loop() {
    init_logging();
    let pool = Arc::new(WorkerPool::new(&PoolSettings::default()).unwrap());
    let event_loop = Arc::new(EventLoop::new());
    let runtime = TaskRuntime::new(pool, event_loop.clone());

    let seen = Arc::new(Mutex::new(None));
    let tasks: Vec<_> = (0..8).map(|i| runtime.submit(move |_| Ok(i))).collect();
    let delivered = counter();
    for task in &tasks {
        let sink = Arc::clone(&seen);
        let delivered = Arc::clone(&delivered);
        task.on_success(move |_| {
            *sink.lock().unwrap() = Some((thread::current().id(), on_callback_context()));
            delivered.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(event_loop.run_until(Duration::from_secs(5), || delivered.load(Ordering::SeqCst) == 8));
    let (thread_id, on_context) = seen.lock().unwrap().unwrap();
    assert_eq!(thread_id, thread::current().id());
    assert!(on_context);
}
