//! Callback registry shared by the settings, resource, and message stores.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::error;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// When a new subscriber first hears from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialNotify {
    /// Only future changes are delivered.
    Deferred,
    /// The current value is delivered once during `subscribe`, then every change.
    Immediate,
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Callbacks never run under this lock, so a poisoned registry is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered set of change callbacks with per-callback panic isolation.
pub struct Observers<T> {
    registry: Arc<Mutex<Registry<T>>>,
    initial: InitialNotify,
}

impl<T: 'static> Observers<T> {
    /// Empty registry using the given first-notification contract.
    #[must_use]
    pub fn new(initial: InitialNotify) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
            initial,
        }
    }

    /// Register `callback`. With [`InitialNotify::Immediate`] it is invoked once
    /// with `current` before this returns.
    pub fn subscribe<F>(&self, callback: F, current: &T) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::clone(&callback)));
            id
        };

        if self.initial == InitialNotify::Immediate {
            invoke(id, &callback, current);
        }

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Deliver `value` to every subscriber in registration order.
    ///
    /// Returns the number of callbacks that panicked.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = lock(&self.registry).entries.clone();
        snapshot
            .iter()
            .filter(|(id, callback)| !invoke(*id, callback, value))
            .count()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    /// Returns true when nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn invoke<T>(id: u64, callback: &Callback<T>, value: &T) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
        Ok(()) => true,
        Err(payload) => {
            error!(subscriber = id, reason = panic_message(payload.as_ref()), "Subscriber panicked");
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Handle returned by `subscribe`. Dropping it removes the callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the callback now.
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
