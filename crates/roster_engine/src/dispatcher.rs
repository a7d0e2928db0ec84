use std::cell::Cell;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use roster_core::lock;

use crate::Job;

thread_local! {
    static ON_CALLBACK_CONTEXT: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is running a job for a dispatcher.
pub fn on_callback_context() -> bool {
    ON_CALLBACK_CONTEXT.with(|flag| flag.get())
}

fn run_on_callback_context(job: Job) {
    let previous = ON_CALLBACK_CONTEXT.with(|flag| flag.replace(true));
    job();
    ON_CALLBACK_CONTEXT.with(|flag| flag.set(previous));
}

/// The single logical context that receives every callback and store
/// notification.
pub trait Dispatcher: Send + Sync {
    fn post(&self, job: Job);
}

/// Runs posted jobs inline on the posting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl Dispatcher for ImmediateDispatcher {
    fn post(&self, job: Job) {
        run_on_callback_context(job);
    }
}

/// Queue of posted jobs drained by whichever thread owns the callback
/// context, in posting order.
pub struct EventLoop {
    tx: mpsc::Sender<Job>,
    rx: Mutex<mpsc::Receiver<Job>>,
}

impl Default for EventLoop {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every job already queued, plus any those jobs post. Returns how
    /// many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.next_job(None) {
            run_on_callback_context(job);
            ran += 1;
        }
        ran
    }

    /// Keeps running jobs as they arrive for `duration`.
    pub fn run_for(&self, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut ran = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return ran + self.run_pending();
            }
            if let Some(job) = self.next_job(Some(remaining)) {
                run_on_callback_context(job);
                ran += 1;
            }
        }
    }

    /// Runs jobs until `done` holds or `timeout` elapses. Returns whether
    /// `done` was reached.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(job) = self.next_job(Some(remaining.min(Duration::from_millis(10)))) {
                run_on_callback_context(job);
            }
        }
    }

    fn next_job(&self, wait: Option<Duration>) -> Option<Job> {
        // The receiver lock is released before the job runs.
        let rx = lock(&self.rx);
        match wait {
            None => rx.try_recv().ok(),
            Some(timeout) => rx.recv_timeout(timeout).ok(),
        }
    }
}

impl Dispatcher for EventLoop {
    fn post(&self, job: Job) {
        // The loop owns the receiver, so the send cannot fail while `self` lives.
        let _ = self.tx.send(job);
    }
}
