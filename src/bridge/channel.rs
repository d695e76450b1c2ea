use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use crate::protocol::{BrowserEvent, ChannelName};

type ListenerFn = dyn Fn(&BrowserEvent) + Send + Sync;

/// Shared handle to an event callback. Clones compare equal to each other and
/// to nothing else, so the handle used to subscribe is the handle used to
/// unsubscribe.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<ListenerFn>,
}

impl Listener {
    pub fn new(callback: impl Fn(&BrowserEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn call(&self, event: &BrowserEvent) {
        (self.callback)(event);
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("ptr", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Ordered subscriber list for one named topic.
pub(crate) struct Channel {
    name: ChannelName,
    subscribers: Mutex<Vec<Listener>>,
}

impl Channel {
    pub(crate) fn create(name: ChannelName) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn name(&self) -> ChannelName {
        self.name
    }

    pub(crate) fn subscribe(&self, listener: &Listener) {
        self.lock().push(listener.clone());
    }

    /// Removes the earliest registration of `listener`.
    pub(crate) fn unsubscribe(&self, listener: &Listener) -> bool {
        let mut subscribers = self.lock();
        match subscribers.iter().position(|current| current == listener) {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Delivers to a snapshot of the subscribers so callbacks may subscribe,
    /// unsubscribe or fire again without holding the lock.
    pub(crate) fn fire(&self, event: &BrowserEvent) -> usize {
        let snapshot = self.lock().clone();
        for listener in &snapshot {
            listener.call(event);
        }
        snapshot.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
