//! # Client-side Cache Reconciliation
//!
//! Mirrors server cart and order state and layers optimistic local edits on top.
//!
//! ## Cart Model
//!
//! ```text
//!   base (last server truth)  +  pending edits (optimistic)  =  view (what the UI shows)
//! ```
//!
//! - The view is one long-lived `Cart` mutated in place; readers holding the
//!   cache see the same object before and after every merge.
//! - A `cart-updated` patch merges into the base field by field. Fields absent
//!   from the patch keep their values. Pending edits are discarded because
//!   server truth supersedes optimistic state.
//! - A `cart-cleared` event empties the cart regardless of prior state.
//! - Patches carry absolute values, so a re-delivered event applies to the
//!   same result (no double counting).
//!
//! ## Order Board
//!
//! Orders keyed by id. `order-created` inserts only when absent, so a
//! re-delivered event is a no-op.

use crate::events::{CartCleared, CartPatch, HubEvent};
use crate::pricing::{validate_note, validate_quantity};
use crate::{BistroError, Cart, CartItem, CartToken, KitchenStatus, LineId, Order, OrderId};
use std::collections::BTreeMap;

// =============================================================================
// CART EDITS
// =============================================================================

/// Identifier of a pending optimistic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditId(pub u64);

/// An optimistic change to the cart, applied locally before the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEdit {
    /// Add a line; merges into an existing line with the same selection.
    AddLine(CartItem),
    /// Change a line's quantity; zero removes the line.
    SetQuantity { line: LineId, quantity: u32 },
    RemoveLine(LineId),
    SetNote { line: LineId, note: Option<String> },
}

impl CartEdit {
    fn apply(&self, cart: &mut Cart) {
        match self {
            Self::AddLine(item) => {
                if let Some(existing) = cart.items.iter_mut().find(|l| l.same_selection(item)) {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                } else {
                    cart.items.push(item.clone());
                }
            }
            Self::SetQuantity { line, quantity } => {
                if *quantity == 0 {
                    cart.items.retain(|l| l.id != *line);
                } else if let Some(existing) = cart.items.iter_mut().find(|l| l.id == *line) {
                    existing.quantity = *quantity;
                }
            }
            Self::RemoveLine(line) => cart.items.retain(|l| l.id != *line),
            Self::SetNote { line, note } => {
                if let Some(existing) = cart.items.iter_mut().find(|l| l.id == *line) {
                    existing.note.clone_from(note);
                }
            }
        }
        cart.recalculate();
    }

    fn target(&self) -> Option<LineId> {
        match self {
            Self::AddLine(_) => None,
            Self::SetQuantity { line, .. } | Self::RemoveLine(line) | Self::SetNote { line, .. } => {
                Some(*line)
            }
        }
    }
}

/// Outcome of applying a server event to a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The event changed the cache; `discarded_edits` optimistic edits were dropped.
    Applied { discarded_edits: usize },
    /// The event was for this cart but the visible cart already matched it.
    Unchanged,
    /// The event was for another cart or not a cart event.
    Ignored,
}

// =============================================================================
// CART CACHE
// =============================================================================

/// Cart mirror with optimistic edits.
#[derive(Debug, Clone, Default)]
pub struct CartCache {
    base: Cart,
    pending: Vec<(EditId, CartEdit)>,
    view: Cart,
    next_edit: u64,
    revision: u64,
}

impl CartCache {
    /// Create an empty cache with no cart token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache seeded with a server cart.
    #[must_use]
    pub fn with_cart(cart: Cart) -> Self {
        let mut cache = Self::new();
        cache.load(&cart);
        cache
    }

    /// The cart as the UI should show it (server state plus pending edits).
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.view
    }

    /// The last confirmed server state.
    #[must_use]
    pub fn base(&self) -> &Cart {
        &self.base
    }

    #[must_use]
    pub fn token(&self) -> &CartToken {
        &self.base.token
    }

    /// Incremented on every visible change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn pending_edits(&self) -> usize {
        self.pending.len()
    }

    /// Replace the cached cart with a freshly fetched one, possibly for a
    /// different token. Pending edits are dropped.
    pub fn load(&mut self, cart: &Cart) {
        self.base.clone_from(cart);
        self.pending.clear();
        self.rebuild();
    }

    /// Apply an optimistic edit and queue it until confirmed or rolled back.
    pub fn edit(&mut self, edit: CartEdit) -> Result<EditId, BistroError> {
        match &edit {
            CartEdit::AddLine(item) => {
                validate_quantity(item.quantity)?;
                validate_note(item.note.as_deref())?;
            }
            CartEdit::SetQuantity { quantity, .. } if *quantity > 0 => {
                validate_quantity(*quantity)?;
            }
            CartEdit::SetNote { note, .. } => validate_note(note.as_deref())?,
            _ => {}
        }
        if let Some(line) = edit.target()
            && self.view.line(line).is_none()
        {
            return Err(BistroError::LineNotFound(line));
        }

        self.next_edit = self.next_edit.saturating_add(1);
        let id = EditId(self.next_edit);
        edit.apply(&mut self.view);
        self.pending.push((id, edit));
        self.bump();
        Ok(id)
    }

    /// The server accepted an edit. When it answered with the authoritative
    /// cart, that cart becomes the new base; remaining edits are replayed on top.
    ///
    /// Returns `false` if the edit was no longer pending.
    pub fn confirm(&mut self, id: EditId, server_cart: Option<&Cart>) -> bool {
        let Some(pos) = self.pending.iter().position(|(edit_id, _)| *edit_id == id) else {
            if let Some(cart) = server_cart {
                self.merge_into_base(&CartPatch::full(cart));
                self.rebuild();
            }
            return false;
        };
        let (_, edit) = self.pending.remove(pos);
        match server_cart {
            Some(cart) => self.merge_into_base(&CartPatch::full(cart)),
            None => edit.apply(&mut self.base),
        }
        self.rebuild();
        true
    }

    /// The server rejected an edit; undo it.
    ///
    /// Returns `false` if the edit was no longer pending.
    pub fn rollback(&mut self, id: EditId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(edit_id, _)| *edit_id != id);
        if self.pending.len() == before {
            return false;
        }
        self.rebuild();
        true
    }

    /// Merge a `cart-updated` patch.
    pub fn apply_patch(&mut self, patch: &CartPatch) -> Reconciliation {
        if !self.accepts(patch.token.as_ref()) {
            return Reconciliation::Ignored;
        }
        let discarded_edits = self.pending.len();
        self.pending.clear();
        self.merge_into_base(patch);
        self.settle(discarded_edits)
    }

    /// Apply a `cart-cleared` event.
    pub fn apply_cleared(&mut self, cleared: &CartCleared) -> Reconciliation {
        if !self.accepts(cleared.token.as_ref()) {
            return Reconciliation::Ignored;
        }
        let discarded_edits = self.pending.len();
        self.pending.clear();
        self.base.clear();
        self.settle(discarded_edits)
    }

    /// Apply any decoded hub event; order events are ignored here.
    pub fn apply_event(&mut self, event: &HubEvent) -> Reconciliation {
        match event {
            HubEvent::CartUpdated(patch) => self.apply_patch(patch),
            HubEvent::CartCleared(cleared) => self.apply_cleared(cleared),
            HubEvent::OrderCreated(_) => Reconciliation::Ignored,
        }
    }

    fn settle(&mut self, discarded_edits: usize) -> Reconciliation {
        if self.rebuild() {
            Reconciliation::Applied { discarded_edits }
        } else {
            Reconciliation::Unchanged
        }
    }

    /// An event without a token (or with a blank one) always applies; one with
    /// a token applies to the cached cart or to a cache that has no token yet.
    fn accepts(&self, token: Option<&CartToken>) -> bool {
        match token {
            None => true,
            Some(token) if token.is_empty() => true,
            Some(token) => self.base.token.is_empty() || *token == self.base.token,
        }
    }

    fn merge_into_base(&mut self, patch: &CartPatch) {
        if let Some(token) = patch.token.as_ref().filter(|t| !t.is_empty()) {
            self.base.token.clone_from(token);
        }
        if let Some(items) = &patch.items {
            self.base.items.clone_from(items);
            self.base.recalculate();
        }
        if let Some(amount) = patch.total_amount {
            self.base.total_amount = amount;
        }
        if let Some(count) = patch.total_items {
            self.base.total_items = count;
        }
    }

    /// Recompute the view in place from base + pending edits. The revision
    /// moves only when the visible cart differs; returns whether it did.
    fn rebuild(&mut self) -> bool {
        let mut next = self.base.clone();
        for (_, edit) in &self.pending {
            edit.apply(&mut next);
        }
        if next == self.view {
            return false;
        }
        self.view.clone_from(&next);
        self.bump();
        true
    }

    fn bump(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}

// =============================================================================
// ORDER BOARD
// =============================================================================

/// Orders seen by this client, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    orders: BTreeMap<OrderId, Order>,
    revision: u64,
}

impl OrderBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order pushed by `order-created`. Returns `false` (and leaves
    /// the cached copy untouched) when the order is already known.
    pub fn insert(&mut self, order: Order) -> bool {
        if self.orders.contains_key(&order.id) {
            return false;
        }
        self.orders.insert(order.id, order);
        self.revision = self.revision.saturating_add(1);
        true
    }

    /// Store a freshly fetched order, replacing any cached copy.
    pub fn upsert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
        self.revision = self.revision.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Move an order line to a new kitchen status.
    pub fn set_item_status(
        &mut self,
        order: OrderId,
        line: LineId,
        status: KitchenStatus,
    ) -> Result<(), BistroError> {
        let cached = self
            .orders
            .get_mut(&order)
            .ok_or(BistroError::OrderNotFound(order))?;
        cached.set_item_status(line, status)?;
        self.revision = self.revision.saturating_add(1);
        Ok(())
    }

    /// Newest orders first (highest id), at most `limit`.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&Order> {
        self.orders.values().rev().take(limit).collect()
    }

    /// Apply a decoded hub event; returns whether the board changed.
    pub fn apply_event(&mut self, event: &HubEvent) -> bool {
        match event {
            HubEvent::OrderCreated(order) => self.insert(order.as_ref().clone()),
            _ => false,
        }
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
