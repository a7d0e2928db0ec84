use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::lock;

/// A payload that may be consumed at most once.
#[derive(Debug)]
pub struct Event<T> {
    value: T,
    handled: AtomicBool,
}

impl<T> Event<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            handled: AtomicBool::new(false),
        }
    }

    /// Returns the payload the first time it is called, `None` afterwards.
    pub fn take(&self) -> Option<T>
    where
        T: Clone,
    {
        if self.handled.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(self.value.clone())
        }
    }

    /// Reads the payload without consuming it.
    pub fn peek(&self) -> &T {
        &self.value
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::Acquire)
    }
}

type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

struct ChannelState<T> {
    latest: Option<Arc<Event<T>>>,
    observer: Option<Observer<T>>,
}

/// Channel of one-shot events with a single attached observer.
///
/// Each emitted payload reaches whichever observer is attached when it is
/// emitted, or the next one to attach, and never more than one of them.
pub struct EventChannel<T> {
    state: Mutex<ChannelState<T>>,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                latest: None,
                observer: None,
            }),
        }
    }
}

impl<T: Clone> EventChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, value: T) {
        let event = Arc::new(Event::new(value));
        let observer = {
            let mut state = lock(&self.state);
            state.latest = Some(Arc::clone(&event));
            state.observer.clone()
        };
        if let Some(observer) = observer {
            if let Some(value) = event.take() {
                observer(value);
            }
        }
    }

    /// Attaches `observer`, replacing any previous one. A pending event that
    /// nobody consumed yet is delivered right away.
    pub fn attach(&self, observer: impl Fn(T) + Send + Sync + 'static) {
        let observer: Observer<T> = Arc::new(observer);
        let latest = {
            let mut state = lock(&self.state);
            state.observer = Some(Arc::clone(&observer));
            state.latest.clone()
        };
        if let Some(value) = latest.and_then(|event| event.take()) {
            observer(value);
        }
    }

    pub fn detach(&self) {
        lock(&self.state).observer = None;
    }

    /// The most recent event, consumed or not.
    pub fn latest(&self) -> Option<Arc<Event<T>>> {
        lock(&self.state).latest.clone()
    }
}
