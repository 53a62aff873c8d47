//! Synchronous publish/subscribe channel between the domain and its observers.
//!
//! # Responsibility
//! - Deliver mutation notifications to presentation and persistence observers.
//! - Keep delivery synchronous, in subscription order, on the caller's thread.
//!
//! # Invariants
//! - The bus is an explicit, injectable value; no process-wide registry.
//! - Publish dispatches over the handler list as of publish time, so handlers
//!   may subscribe or unsubscribe re-entrantly without affecting the dispatch
//!   already in flight.

use crate::manager::{ManagerSnapshot, ProjectListEntry};
use crate::model::todo::TodoSnapshot;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Notification published after a mutating manager command completes.
///
/// Payloads carry the refreshed data observers render or persist, so a
/// subscriber never has to re-query domain state mid-dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The current filtered and sorted todo view.
    TodosUpdated(Vec<TodoSnapshot>),
    /// The project listing, virtual all-projects entry first.
    ProjectListChanged(Vec<ProjectListEntry>),
    /// The full aggregate snapshot for the persistence collaborator.
    StateChanged(ManagerSnapshot),
}

impl Event {
    /// Subscription key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::TodosUpdated(_) => EventKind::TodosUpdated,
            Self::ProjectListChanged(_) => EventKind::ProjectListChanged,
            Self::StateChanged(_) => EventKind::StateChanged,
        }
    }
}

/// Payload-free discriminator used to key subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    TodosUpdated,
    ProjectListChanged,
    StateChanged,
}

/// Token identifying one subscription.
///
/// Closures carry no usable identity, so removal goes by token instead of
/// by handler comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: BTreeMap<EventKind, Vec<Subscriber>>,
}

/// Synchronous publish/subscribe registry.
///
/// Cloning shares the underlying registry: the bus is constructed once per
/// session and a clone is handed to the manager and to every collaborator
/// that observes it.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Handlers are opaque closures; only the registry shape is printable.
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind` and returns its subscription token.
    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&Event) + 'static) -> SubscriptionId {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.subscribers.entry(kind).or_default().push(Subscriber {
            id,
            handler: Rc::new(handler),
        });
        id
    }

    /// Removes the subscription with the given token.
    ///
    /// Returns `false` when no such subscription exists under `kind`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let Some(subscribers) = registry.subscribers.get_mut(&kind) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }

    /// Invokes every handler subscribed to the event's kind, in subscription
    /// order, synchronously on the caller's thread.
    pub fn publish(&self, event: &Event) {
        // The registry borrow must not be held across handler calls; handlers
        // are free to subscribe or unsubscribe while running.
        let handlers: Vec<Handler> = {
            let registry = self.registry.borrow();
            registry
                .subscribers
                .get(&event.kind())
                .map(|subscribers| {
                    subscribers
                        .iter()
                        .map(|subscriber| Rc::clone(&subscriber.handler))
                        .collect()
                })
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .borrow()
            .subscribers
            .get(&kind)
            .map_or(0, Vec::len)
    }
}
