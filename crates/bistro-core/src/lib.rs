//! # bistro-core
//!
//! Data model and client-side state for the Bistro point-of-sale client.
//!
//! The storefront server owns every cart and order. This crate mirrors that
//! state on the client, prices selections for optimistic display, decodes the
//! events the real-time hub pushes, and reconciles them with local edits.
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Deterministic: ordered maps only, integer money
//! - Server values always win over locally derived ones

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod envelope;
pub mod events;
pub mod pricing;
pub mod primitives;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BistroError, Cart, CartItem, CartToken, Category, CategoryId, DailySales, DashboardReport,
    Ingredient, KitchenStatus, LineId, MenuItem, MenuItemId, Money, OptionDetail, OptionGroup,
    OptionGroupId, OptionId, Order, OrderId, OrderItem, PaymentMethod, Recipe, RecipeId, TopItem,
};

// =============================================================================
// RE-EXPORTS: Client State
// =============================================================================

pub use cache::{CartCache, CartEdit, EditId, OrderBoard, Reconciliation};
pub use envelope::{ApiEnvelope, Page, PageMeta};
pub use events::{CartCleared, CartPatch, HubEvent};
pub use pricing::{Quote, quote};
pub use storage::{LocalStore, StoredSession};
