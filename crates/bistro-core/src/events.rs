//! # Hub Events
//!
//! Decoding of the named events pushed over the real-time channel.
//!
//! | Event           | Payload                                        |
//! |-----------------|------------------------------------------------|
//! | `order-created` | full `Order`                                   |
//! | `cart-updated`  | partial cart (`token`, `items`, totals)        |
//! | `cart-cleared`  | `null`, a token string, or `{ "token": ... }`  |
//!
//! Payloads wrapped in a single-element argument array are unwrapped first.

use crate::primitives::{EVENT_CART_CLEARED, EVENT_CART_UPDATED, EVENT_ORDER_CREATED};
use crate::{BistroError, Cart, CartItem, CartToken, Money, Order};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A partial cart. Absent fields leave the cached value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartPatch {
    #[serde(default)]
    pub token: Option<CartToken>,
    #[serde(default)]
    pub items: Option<Vec<CartItem>>,
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub total_items: Option<u32>,
}

impl CartPatch {
    /// A patch carrying every field of a server cart.
    #[must_use]
    pub fn full(cart: &Cart) -> Self {
        Self {
            token: Some(cart.token.clone()),
            items: Some(cart.items.clone()),
            total_amount: Some(cart.total_amount),
            total_items: Some(cart.total_items),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
            && self.items.is_none()
            && self.total_amount.is_none()
            && self.total_items.is_none()
    }
}

/// Payload of a `cart-cleared` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartCleared {
    #[serde(default)]
    pub token: Option<CartToken>,
}

/// A decoded hub event relevant to the cart and order caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    OrderCreated(Box<Order>),
    CartUpdated(CartPatch),
    CartCleared(CartCleared),
}

impl HubEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated(_) => EVENT_ORDER_CREATED,
            Self::CartUpdated(_) => EVENT_CART_UPDATED,
            Self::CartCleared(_) => EVENT_CART_CLEARED,
        }
    }

    /// Decode a named event. Returns `Ok(None)` for names this module does
    /// not handle; event names match case-insensitively.
    pub fn decode(name: &str, payload: &Value) -> Result<Option<Self>, BistroError> {
        let payload = unwrap_arguments(payload);

        if name.eq_ignore_ascii_case(EVENT_ORDER_CREATED) {
            let order: Order = decode_payload(EVENT_ORDER_CREATED, payload)?;
            return Ok(Some(Self::OrderCreated(Box::new(order))));
        }

        if name.eq_ignore_ascii_case(EVENT_CART_UPDATED) {
            let mut patch: CartPatch = decode_payload(EVENT_CART_UPDATED, payload)?;
            patch.token = patch.token.filter(|t| !t.is_empty());
            return Ok(Some(Self::CartUpdated(patch)));
        }

        if name.eq_ignore_ascii_case(EVENT_CART_CLEARED) {
            let mut cleared = match payload {
                Value::Null => CartCleared::default(),
                Value::String(token) => CartCleared {
                    token: Some(CartToken::new(token.as_str())),
                },
                other => decode_payload::<CartCleared>(EVENT_CART_CLEARED, other)?,
            };
            cleared.token = cleared.token.filter(|t| !t.is_empty());
            return Ok(Some(Self::CartCleared(cleared)));
        }

        Ok(None)
    }
}

fn unwrap_arguments(payload: &Value) -> &Value {
    match payload {
        Value::Array(args) if args.len() == 1 => &args[0],
        other => other,
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    event: &str,
    payload: &Value,
) -> Result<T, BistroError> {
    T::deserialize(payload).map_err(|e| BistroError::MalformedEvent {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_cart_updated_partial() {
        let payload = json!({ "totalAmount": 1200, "totalItems": 3 });
        let event = HubEvent::decode("cart-updated", &payload)
            .expect("decode")
            .expect("known event");
        match event {
            HubEvent::CartUpdated(patch) => {
                assert!(patch.items.is_none());
                assert_eq!(patch.total_amount, Some(Money(1200)));
                assert_eq!(patch.total_items, Some(3));
            }
            other => assert_eq!(other.name(), EVENT_CART_UPDATED),
        }
    }

    #[test]
    fn decode_cart_cleared_variants() {
        for payload in [json!(null), json!("tok-1"), json!({ "token": "tok-1" }), json!(["tok-1"])] {
            let event = HubEvent::decode("Cart-Cleared", &payload)
                .expect("decode")
                .expect("known event");
            assert_eq!(event.name(), EVENT_CART_CLEARED);
        }
    }

    #[test]
    fn blank_tokens_decode_as_absent() {
        for payload in [json!(""), json!(" "), json!({ "token": "" }), json!([""])] {
            let event = HubEvent::decode("cart-cleared", &payload)
                .expect("decode")
                .expect("known event");
            assert_eq!(event, HubEvent::CartCleared(CartCleared::default()));
        }

        let event = HubEvent::decode("cart-updated", &json!({ "token": "", "totalItems": 0 }))
            .expect("decode")
            .expect("known event");
        assert!(matches!(event, HubEvent::CartUpdated(patch) if patch.token.is_none()));
    }

    #[test]
    fn decode_order_created_unwraps_argument_array() {
        let payload = json!([{
            "id": 5,
            "customerName": "Bo",
            "paymentMethod": "card",
            "items": [],
            "totalAmount": 0
        }]);
        let event = HubEvent::decode("order-created", &payload)
            .expect("decode")
            .expect("known event");
        assert!(matches!(event, HubEvent::OrderCreated(order) if order.customer_name == "Bo"));
    }

    #[test]
    fn malformed_payload_is_error() {
        let payload = json!({ "items": "not a list" });
        assert!(matches!(
            HubEvent::decode("cart-updated", &payload),
            Err(BistroError::MalformedEvent { .. })
        ));
    }

    #[test]
    fn unknown_event_is_none() {
        let decoded = HubEvent::decode("menu-changed", &json!({})).expect("decode");
        assert!(decoded.is_none());
    }
}
