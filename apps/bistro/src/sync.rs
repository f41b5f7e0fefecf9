//! # Live Cache Binding
//!
//! Connects hub events to the client caches:
//!
//! ```text
//! hub ──order-created──▶ OrderBoard
//!     ──cart-updated───▶ CartCache (merge)
//!     ──cart-cleared───▶ CartCache (reset)
//! ```
//!
//! Every visible change bumps a revision published on a watch channel.

use crate::hub::{HubClient, Subscription, Transport};
use bistro_core::primitives::{EVENT_CART_CLEARED, EVENT_CART_UPDATED, EVENT_ORDER_CREATED};
use bistro_core::{Cart, CartCache, HubEvent, LocalStore, Order, OrderBoard, Reconciliation};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Caches kept in sync with the hub.
#[derive(Debug, Default)]
pub struct LiveState {
    pub cart: CartCache,
    pub orders: OrderBoard,
}

impl LiveState {
    fn revision(&self) -> u64 {
        self.cart.revision().saturating_add(self.orders.revision())
    }
}

/// Shared, hub-driven cart and order caches.
#[derive(Clone)]
pub struct LiveCart {
    state: Arc<Mutex<LiveState>>,
    revision: Arc<watch::Sender<u64>>,
    store: Option<Arc<LocalStore>>,
}

impl std::fmt::Debug for LiveCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCart")
            .field("revision", &*self.revision.borrow())
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

/// Handlers registered by [`LiveCart::attach`].
#[derive(Debug)]
#[must_use = "dropping the attachment keeps the handlers registered"]
pub struct Attachment {
    subscriptions: Vec<Subscription>,
}

impl Attachment {
    /// Remove this binding's handlers, leaving other subscribers alone.
    pub fn detach<T: Transport>(self, hub: &HubClient<T>) {
        for subscription in &self.subscriptions {
            hub.off(subscription);
        }
    }
}

impl LiveCart {
    pub fn new(cart: CartCache) -> Self {
        let state = LiveState {
            cart,
            orders: OrderBoard::new(),
        };
        let (revision, _) = watch::channel(state.revision());
        Self {
            state: Arc::new(Mutex::new(state)),
            revision: Arc::new(revision),
            store: None,
        }
    }

    /// Save a cart snapshot to the store after every cart change.
    #[must_use]
    pub fn with_store(mut self, store: Arc<LocalStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn lock(&self) -> MutexGuard<'_, LiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register handlers for the cart and order events.
    pub fn attach<T: Transport>(&self, hub: &HubClient<T>) -> Attachment {
        let subscriptions = [EVENT_ORDER_CREATED, EVENT_CART_UPDATED, EVENT_CART_CLEARED]
            .into_iter()
            .map(|event| {
                let live = self.clone();
                hub.on(event, move |payload| {
                    live.handle(event, payload);
                })
            })
            .collect();
        Attachment { subscriptions }
    }

    /// Decode and apply one event. Returns whether a cache changed.
    pub fn handle(&self, event: &str, payload: &Value) -> bool {
        let decoded = match HubEvent::decode(event, payload) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(event, error = %e, "Dropping malformed hub event");
                return false;
            }
        };
        self.apply(&decoded)
    }

    /// Apply a decoded event to the caches.
    pub fn apply(&self, event: &HubEvent) -> bool {
        let (changed, snapshot) = {
            let mut state = self.lock();
            let snapshot = match state.cart.apply_event(event) {
                Reconciliation::Applied { discarded_edits } => {
                    if discarded_edits > 0 {
                        tracing::debug!(discarded_edits, "Server cart superseded local edits");
                    }
                    Some(state.cart.cart().clone())
                }
                Reconciliation::Unchanged | Reconciliation::Ignored => None,
            };
            let board_changed = state.orders.apply_event(event);
            if snapshot.is_some() || board_changed {
                self.revision.send_replace(state.revision());
            }
            (snapshot.is_some() || board_changed, snapshot)
        };

        if let (Some(cart), Some(store)) = (snapshot, &self.store)
            && let Err(e) = store.save_cart(&cart)
        {
            tracing::warn!(error = %e, "Failed to save cart snapshot");
        }
        changed
    }

    /// Run `f` against the caches, e.g. to stage an optimistic edit.
    pub fn update<R>(&self, f: impl FnOnce(&mut LiveState) -> R) -> R {
        let mut state = self.lock();
        let before = state.revision();
        let result = f(&mut state);
        let after = state.revision();
        if after != before {
            self.revision.send_replace(after);
        }
        result
    }

    /// The visible cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.lock().cart.cart().clone()
    }

    /// Newest orders first.
    #[must_use]
    pub fn recent_orders(&self, limit: usize) -> Vec<Order> {
        self.lock()
            .orders
            .recent(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Receiver notified on every cache change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
