//! Interaction event target and the listener set attached to it.

use std::fmt;
use std::sync::Arc;

use neas_core::events::InteractionKind;
use neas_core::listener::{ListenerRegistry, Subscription};

/// The event target UI code dispatches interaction signals to.
///
/// One registry per [`InteractionKind`]; listeners only see the kind they
/// registered for.
#[derive(Clone, Default)]
pub struct InteractionHub {
    registries: Arc<[ListenerRegistry<InteractionKind>; 4]>,
}

impl InteractionHub {
    /// Create a hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of signal.
    pub fn add_listener<F>(&self, kind: InteractionKind, listener: F) -> Subscription
    where
        F: Fn(&InteractionKind) + Send + Sync + 'static,
    {
        self.registries[kind.index()].subscribe(listener)
    }

    /// Deliver a signal. Returns how many listeners ran.
    pub fn dispatch(&self, kind: InteractionKind) -> usize {
        self.registries[kind.index()].emit(&kind)
    }

    /// Listeners registered for `kind`.
    pub fn listener_count(&self, kind: InteractionKind) -> usize {
        self.registries[kind.index()].len()
    }

    /// Listeners registered across all kinds.
    pub fn total_listeners(&self) -> usize {
        self.registries.iter().map(ListenerRegistry::len).sum()
    }
}

impl fmt::Debug for InteractionHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHub")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

/// One listener per interaction kind, all routed to the same handler.
///
/// Attached when a session becomes active and detached (or dropped) when it
/// ends, so the listeners never outlive the session they guard.
#[derive(Debug)]
pub struct ActivityListeners {
    subscriptions: Vec<Subscription>,
}

impl ActivityListeners {
    /// Attach `on_activity` to every interaction kind on `hub`.
    pub fn attach<F>(hub: &InteractionHub, on_activity: F) -> Self
    where
        F: Fn(InteractionKind) + Send + Sync + 'static,
    {
        let on_activity = Arc::new(on_activity);
        let subscriptions = InteractionKind::ALL
            .iter()
            .map(|&kind| {
                let handler = Arc::clone(&on_activity);
                hub.add_listener(kind, move |k| handler(*k))
            })
            .collect();

        Self { subscriptions }
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Remove every listener from the hub.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
