//! # Primitives
//!
//! Fixed names and limits shared by the client layers.

// =============================================================================
// HUB EVENT NAMES
// =============================================================================

/// Pushed after checkout; payload is the created order.
pub const EVENT_ORDER_CREATED: &str = "order-created";

/// Pushed whenever server-side cart state changes; payload is a partial cart.
pub const EVENT_CART_UPDATED: &str = "cart-updated";

/// Pushed when a cart is emptied (checkout or explicit clear).
pub const EVENT_CART_CLEARED: &str = "cart-cleared";

// =============================================================================
// LOCAL STORE KEYS
// =============================================================================

/// Bearer token of the signed-in user.
pub const KEY_AUTH_TOKEN: &str = "auth_token";

/// Token of the anonymous cart this client owns.
pub const KEY_CART_TOKEN: &str = "cart_token";

/// Last known cart, for offline display on start-up.
pub const KEY_CART_SNAPSHOT: &str = "cart_snapshot";

/// Version byte prefixed to postcard-encoded snapshots.
///
/// Increment this when making breaking changes to stored shapes.
pub const SNAPSHOT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Largest quantity accepted for a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Maximum length of a free-text note on a cart line.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Largest page size requested from list endpoints.
pub const MAX_PAGE_SIZE: u32 = 200;
