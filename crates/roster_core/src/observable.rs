use std::sync::{Arc, Mutex};

use crate::{lock, SubscriptionId};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Observed<T> {
    value: T,
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_id: u64,
}

/// Latest-value holder with change observers.
///
/// A new observer is called with the current value immediately, then with
/// every subsequent value. Observers run on the thread that sets the value
/// and never under the internal lock.
pub struct Observable<T> {
    inner: Mutex<Observed<T>>,
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Observed {
                value,
                observers: Vec::new(),
                next_id: 0,
            }),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    pub fn set(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let mut inner = lock(&self.inner);
            inner.value = value.clone();
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };
        for observer in observers {
            observer(&value);
        }
    }

    pub fn observe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let observer: Observer<T> = Arc::new(observer);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            inner.next_id += 1;
            let id = SubscriptionId(inner.next_id);
            inner.observers.push((id, Arc::clone(&observer)));
            (id, inner.value.clone())
        };
        observer(&current);
        id
    }

    /// Returns false when `id` was not registered.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.observers.len();
        inner.observers.retain(|(existing, _)| *existing != id);
        inner.observers.len() != before
    }
}
