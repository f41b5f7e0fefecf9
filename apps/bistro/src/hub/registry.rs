//! Subscriber registry: event name -> ordered callbacks.
//!
//! Names are normalized (trimmed, ASCII-lowercased) so `Cart-Updated` and
//! `cart-updated` reach the same subscribers.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A subscriber callback.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by `on`, used to remove exactly that callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: String,
    id: u64,
}

impl Subscription {
    /// Normalized event name this subscription listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    handlers: BTreeMap<String, Vec<(u64, Handler)>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("Registry").field("handlers", &counts).finish()
    }
}

pub(crate) fn normalize(event: &str) -> String {
    event.trim().to_ascii_lowercase()
}

impl Registry {
    pub(crate) fn add(&mut self, event: &str, handler: Handler) -> Subscription {
        self.next_id = self.next_id.saturating_add(1);
        let id = self.next_id;
        let event = normalize(event);
        self.handlers
            .entry(event.clone())
            .or_default()
            .push((id, handler));
        Subscription { event, id }
    }

    pub(crate) fn remove(&mut self, subscription: &Subscription) -> bool {
        let Some(list) = self.handlers.get_mut(&subscription.event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != subscription.id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(&subscription.event);
        }
        removed
    }

    pub(crate) fn remove_all(&mut self, event: &str) -> usize {
        self.handlers
            .remove(&normalize(event))
            .map_or(0, |list| list.len())
    }

    /// Snapshot of the callbacks for an event, in registration order.
    pub(crate) fn handlers_for(&self, event: &str) -> Vec<Handler> {
        self.handlers
            .get(&normalize(event))
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.handlers.get(&normalize(event)).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let handler: Handler = Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (hits, handler)
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut registry = Registry::default();
        let (_, handler) = counter();
        let sub = registry.add(" Cart-Updated ", handler);
        assert_eq!(sub.event(), "cart-updated");
        assert_eq!(registry.count("CART-UPDATED"), 1);
    }

    #[test]
    fn remove_only_targets_one_handler() {
        let mut registry = Registry::default();
        let (a_hits, a) = counter();
        let (b_hits, b) = counter();
        let sub_a = registry.add("order-created", a);
        let _sub_b = registry.add("order-created", b);

        assert!(registry.remove(&sub_a));
        assert!(!registry.remove(&sub_a));
        for handler in registry.handlers_for("order-created") {
            handler(&Value::Null);
        }
        assert_eq!(a_hits.load(Ordering::SeqCst), 0);
        assert_eq!(b_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remove_all_clears_event() {
        let mut registry = Registry::default();
        for _ in 0..3 {
            let (_, handler) = counter();
            registry.add("cart-cleared", handler);
        }
        assert_eq!(registry.remove_all("cart-cleared"), 3);
        assert!(registry.handlers_for("cart-cleared").is_empty());
    }
}
