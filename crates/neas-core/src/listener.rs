//! Callback registry with explicit, droppable subscriptions.
//!
//! Both the identity service's session-change notifications and the UI's
//! interaction signals are delivered through a [`ListenerRegistry`]. Every
//! registration hands back a [`Subscription`]; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the callback, so a listener can
//! never outlive its owner.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

/// Identifier of a registered listener.
pub type ListenerId = u64;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct RegistryInner<E> {
    next_id: AtomicU64,
    listeners: DashMap<ListenerId, Callback<E>>,
}

/// A set of callbacks invoked for every emitted event.
pub struct ListenerRegistry<E> {
    inner: Arc<RegistryInner<E>>,
}

impl<E: 'static> ListenerRegistry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                listeners: DashMap::new(),
            }),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// subscription is dropped or unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.insert(id, Arc::new(callback));

        let weak: Weak<RegistryInner<E>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.remove(&id);
            }
        })
    }

    /// Invoke every registered callback with `event`.
    ///
    /// Callbacks are snapshotted first, so a callback may add or remove
    /// listeners without deadlocking. Returns the number of callbacks run.
    pub fn emit(&self, event: &E) -> usize {
        let callbacks: Vec<Callback<E>> = self
            .inner
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.listeners.is_empty()
    }
}

impl<E: 'static> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Clone for ListenerRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: 'static> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

/// Handle to a registered listener. Removes the listener when dropped.
#[must_use = "dropping a Subscription immediately unregisters the listener"]
pub struct Subscription {
    id: ListenerId,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap an arbitrary release action. Event sources that do not use
    /// [`ListenerRegistry`] can still hand out subscriptions this way.
    pub fn new<F>(id: ListenerId, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    /// The listener this subscription controls.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.release.is_some())
            .finish()
    }
}
