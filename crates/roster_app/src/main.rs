//! Headless walkthrough of the roster engine: loads a small user directory,
//! moves and deletes entries, then opens one entry's details and deletes it
//! from there. Every published view is printed as it arrives.

mod fixture;
mod report;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context};
use roster_core::lock;
use roster_engine::{
    DetailsController, EntityStore, EventLoop, ListController, PoolSettings, StoreSettings,
    TaskRuntime, WorkerPool,
};
use roster_logging::{roster_info, LogSettings};

use fixture::Directory;

/// Overrides the simulated store latency, in milliseconds.
const LATENCY_ENV: &str = "ROSTER_LATENCY_MS";
const DEFAULT_LATENCY: Duration = Duration::from_millis(200);
const STEP_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    roster_logging::initialize(&LogSettings::from_env());
    let latency = latency_from_env()?;
    roster_info!("roster demo starting (latency {:?})", latency);

    let pool = Arc::new(WorkerPool::new(&PoolSettings::default())?);
    let event_loop = Arc::new(EventLoop::new());
    let runtime = TaskRuntime::new(pool, event_loop.clone());
    let store = Arc::new(EntityStore::new(
        runtime,
        Directory::sample(),
        StoreSettings::with_latency(latency),
    ));

    let list = ListController::new(Arc::clone(&store));
    list.items().observe(|view| print_lines(report::list_lines(view)));
    list.notices().attach(|notice| println!("! {notice}"));
    let requested = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&requested);
    list.details_requests().attach(move |id| *lock(&sink) = Some(id));

    list.start();
    pump(&event_loop, || list.items().get().is_terminal())?;

    list.on_move(1, 1);
    list.on_move(1, 1);
    list.on_delete(4);
    pump(&event_loop, || !list.is_busy(1) && !list.is_busy(4))?;

    list.on_details(3);
    let Some(id) = lock(&requested).take() else {
        bail!("details request was not delivered");
    };

    let details = DetailsController::new(Arc::clone(&store), id);
    details
        .state()
        .observe(|state| print_lines(report::details_lines(state)));
    details.notices().attach(|notice| println!("! {notice}"));
    let closed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&closed);
    details
        .go_back()
        .attach(move |()| flag.store(true, Ordering::SeqCst));

    details.start();
    pump(&event_loop, || {
        details.state().get().show_content() || closed.load(Ordering::SeqCst)
    })?;
    if !closed.load(Ordering::SeqCst) {
        details.delete();
        pump(&event_loop, || closed.load(Ordering::SeqCst))?;
    }
    details.teardown();

    pump(&event_loop, || {
        store.snapshot().len()
            == list
                .items()
                .get()
                .success()
                .map_or(0, |items| items.len())
    })?;
    list.teardown();
    roster_info!("roster demo finished with {} users", store.snapshot().len());
    Ok(())
}

fn latency_from_env() -> anyhow::Result<Duration> {
    match std::env::var(LATENCY_ENV) {
        Ok(raw) => {
            let millis: u64 = raw.trim().parse().with_context(|| {
                format!("{LATENCY_ENV} must be a whole number of milliseconds, got {raw:?}")
            })?;
            Ok(Duration::from_millis(millis))
        }
        Err(_) => Ok(DEFAULT_LATENCY),
    }
}

/// Drains the callback context until `done` holds.
fn pump(event_loop: &EventLoop, done: impl FnMut() -> bool) -> anyhow::Result<()> {
    if event_loop.run_until(STEP_TIMEOUT, done) {
        Ok(())
    } else {
        bail!("no progress within {STEP_TIMEOUT:?}")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
