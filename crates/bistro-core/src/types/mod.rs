//! # Core Type Definitions
//!
//! This module contains the data-transfer shapes mirrored from the storefront API:
//! - Identifiers (`MenuItemId`, `OrderId`, `LineId`, ...) and `CartToken`
//! - Money (`Money`, integer minor units)
//! - Cart and order shapes (`Cart`, `CartItem`, `Order`, `OrderItem`)
//! - Menu shapes (`MenuItem`, `OptionGroup`, `OptionDetail`, `Category`, `Recipe`)
//! - Dashboard report shapes
//! - Error types (`BistroError`)
//!
//! ## Wire Conventions
//!
//! - Field names are camelCase on the wire
//! - Amounts are integers in minor currency units; no floating point anywhere
//! - Derived totals are recomputed locally but the server's values always win

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a menu item.
    MenuItemId
);
id_type!(
    /// Identifier of a menu category.
    CategoryId
);
id_type!(
    /// Identifier of a selectable option detail inside an option group.
    OptionId
);
id_type!(
    /// Identifier of an option group.
    OptionGroupId
);
id_type!(
    /// Identifier of a placed order.
    OrderId
);
id_type!(
    /// Identifier of a cart line or order line.
    /// `LineId(0)` marks a provisional line the server has not numbered yet.
    LineId
);
id_type!(
    /// Identifier of a recipe.
    RecipeId
);

impl LineId {
    /// The placeholder id carried by optimistic lines.
    pub const PROVISIONAL: Self = Self(0);

    /// Whether the server has not assigned this line an id yet.
    #[must_use]
    pub const fn is_provisional(self) -> bool {
        self.0 == 0
    }
}

/// Opaque client-held identifier correlating an anonymous shopping session
/// to server-side cart state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CartToken(pub String);

impl CartToken {
    /// Create a cart token from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank token, or one that has never been assigned by the server.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// MONEY
// =============================================================================

/// An amount in minor currency units (e.g. cents).
///
/// All arithmetic saturates instead of overflowing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Get the raw minor-unit value.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply by a quantity.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = BistroError;

    /// Parse a decimal amount such as `12`, `12.5` or `-0.99`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BistroError::InvalidInput(format!("Invalid amount: {}", s));
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

// =============================================================================
// CART
// =============================================================================

/// A line in a shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default)]
    pub id: LineId,
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Sum of the extra prices of the selected options, per unit.
    #[serde(default)]
    pub extra_price: Money,
    #[serde(default)]
    pub options: Vec<OptionId>,
    #[serde(default)]
    pub note: Option<String>,
}

impl CartItem {
    /// `(unit_price + extra_price) * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price
            .saturating_add(self.extra_price)
            .times(self.quantity)
    }

    /// Two lines describe the same purchase when menu item, selected
    /// options and note all match. Option order is irrelevant.
    #[must_use]
    pub fn same_selection(&self, other: &Self) -> bool {
        if self.menu_item_id != other.menu_item_id || self.note != other.note {
            return false;
        }
        let mut a = self.options.clone();
        let mut b = other.options.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

/// A shopping cart as mirrored from the server.
///
/// `total_amount` and `total_items` are derived values; see [`Cart::recalculate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub token: CartToken,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub total_items: u32,
}

impl Cart {
    /// Create an empty cart for the given token.
    #[must_use]
    pub fn new(token: CartToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Recompute `total_amount` and `total_items` from the lines.
    pub fn recalculate(&mut self) {
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
        self.total_items = self
            .items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity));
    }

    /// Remove every line and zero the totals. The token is kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_amount = Money::ZERO;
        self.total_items = 0;
    }

    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// ORDERS
// =============================================================================

/// Lifecycle tag of an order line in the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KitchenStatus {
    #[default]
    Waiting,
    Cooking,
    Done,
    Cancelled,
}

impl KitchenStatus {
    /// Lower-case wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Cooking => "cooking",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Done and cancelled lines never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Allowed moves: waiting -> cooking -> done, and waiting/cooking -> cancelled.
    /// Staying in the same state is always allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Waiting, Self::Cooking)
                | (Self::Cooking, Self::Done)
                | (Self::Waiting | Self::Cooking, Self::Cancelled)
        )
    }
}

impl fmt::Display for KitchenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KitchenStatus {
    type Err = BistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiting" => Ok(Self::Waiting),
            "cooking" => Ok(Self::Cooking),
            "done" => Ok(Self::Done),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(BistroError::InvalidInput(format!(
                "Unknown kitchen status: {}. Use: waiting, cooking, done, cancelled",
                other
            ))),
        }
    }
}

/// How the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    #[serde(rename = "eWallet")]
    EWallet,
}

impl FromStr for PaymentMethod {
    type Err = BistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "banktransfer" | "transfer" => Ok(Self::BankTransfer),
            "ewallet" | "wallet" => Ok(Self::EWallet),
            _ => Err(BistroError::InvalidInput(format!(
                "Unknown payment method: {}. Use: cash, card, bank-transfer, e-wallet",
                s
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank-transfer",
            Self::EWallet => "e-wallet",
        };
        f.write_str(name)
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: LineId,
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub extra_price: Money,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub status: KitchenStatus,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price
            .saturating_add(self.extra_price)
            .times(self.quantity)
    }
}

/// An order created from a cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub code: String,
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub created_at: String,
}

impl Order {
    #[must_use]
    pub fn item(&self, id: LineId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Move one line to a new kitchen status, validating the transition.
    pub fn set_item_status(&mut self, id: LineId, status: KitchenStatus) -> Result<(), BistroError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(BistroError::LineNotFound(id))?;
        if !item.status.can_transition_to(status) {
            return Err(BistroError::InvalidTransition {
                from: item.status,
                to: status,
            });
        }
        item.status = status;
        Ok(())
    }

    /// Every line is done or cancelled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.status.is_terminal())
    }
}

// =============================================================================
// MENU
// =============================================================================

/// One selectable choice inside an option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDetail {
    pub id: OptionId,
    pub name: String,
    #[serde(default)]
    pub extra_price: Money,
}

/// A group of options on a menu item (e.g. "Size", "Toppings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    pub id: OptionGroupId,
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Maximum number of selections; 0 means unlimited.
    #[serde(default)]
    pub max_select: u32,
    #[serde(default)]
    pub options: Vec<OptionDetail>,
}

fn default_available() -> bool {
    true
}

/// A sellable menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Money,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub option_groups: Vec<OptionGroup>,
}

impl MenuItem {
    /// Find an option and the group it belongs to.
    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<(&OptionGroup, &OptionDetail)> {
        self.option_groups.iter().find_map(|group| {
            group
                .options
                .iter()
                .find(|opt| opt.id == id)
                .map(|opt| (group, opt))
        })
    }
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

/// Kitchen recipe attached to a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Option<String>,
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Best-selling item in a report period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub quantity: u64,
    pub revenue: Money,
}

/// Revenue for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: String,
    pub revenue: Money,
    pub orders: u64,
}

/// Sales summary shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default)]
    pub items_sold: u64,
    #[serde(default)]
    pub top_items: Vec<TopItem>,
    #[serde(default)]
    pub daily: Vec<DailySales>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the model layer.
///
/// Remote failures arrive as [`BistroError::Api`] carrying the server's message.
#[derive(Debug, Error)]
pub enum BistroError {
    /// A caller-supplied value is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The selected option does not belong to the menu item.
    #[error("Option {option} does not belong to menu item {item}")]
    UnknownOption { item: MenuItemId, option: OptionId },

    /// A required option group has no selection.
    #[error("Option group '{group}' requires a selection")]
    MissingRequiredOption { group: String },

    /// An option group has more selections than it allows.
    #[error("Option group '{group}' allows at most {max} selections, got {got}")]
    TooManyOptions { group: String, max: u32, got: usize },

    /// The menu item is currently not sold.
    #[error("Menu item {0} is not available")]
    Unavailable(MenuItemId),

    /// A kitchen status change that the lifecycle does not allow.
    #[error("Invalid kitchen status transition: {from} -> {to}")]
    InvalidTransition {
        from: KitchenStatus,
        to: KitchenStatus,
    },

    /// The referenced order is not cached.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The referenced cart or order line does not exist.
    #[error("Line not found: {0}")]
    LineNotFound(LineId),

    /// The API answered with `success = false`.
    #[error("API error: {0}")]
    Api(String),

    /// The API answered with `success = true` but no result payload.
    #[error("Response contained no result")]
    EmptyResult,

    /// A hub event payload could not be decoded.
    #[error("Malformed '{event}' event: {reason}")]
    MalformedEvent { event: String, reason: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The local store failed.
    #[error("Storage error: {0}")]
    StorageError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: u64, menu: u64, qty: u32, unit: i64, extra: i64) -> CartItem {
        CartItem {
            id: LineId(id),
            menu_item_id: MenuItemId(menu),
            name: format!("item-{}", menu),
            quantity: qty,
            unit_price: Money(unit),
            extra_price: Money(extra),
            options: Vec::new(),
            note: None,
        }
    }

    #[test]
    fn money_display_pads_minor_units() {
        assert_eq!(Money(1250).to_string(), "12.50");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(-199).to_string(), "-1.99");
    }

    #[test]
    fn money_parses_decimal_text() {
        assert_eq!("12.50".parse::<Money>().expect("parse"), Money(1250));
        assert_eq!("12.5".parse::<Money>().expect("parse"), Money(1250));
        assert_eq!("7".parse::<Money>().expect("parse"), Money(700));
        assert_eq!("-0.99".parse::<Money>().expect("parse"), Money(-99));
        assert!("1.999".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn money_times_saturates() {
        assert_eq!(Money(i64::MAX).times(2), Money(i64::MAX));
        assert_eq!(Money(300).times(3), Money(900));
    }

    #[test]
    fn cart_recalculate_sums_lines() {
        let mut cart = Cart::new(CartToken::new("t"));
        cart.items.push(line(1, 10, 2, 500, 100));
        cart.items.push(line(2, 11, 1, 250, 0));
        cart.recalculate();
        assert_eq!(cart.total_amount, Money(1450));
        assert_eq!(cart.total_items, 3);
    }

    #[test]
    fn cart_clear_keeps_token() {
        let mut cart = Cart::new(CartToken::new("abc"));
        cart.items.push(line(1, 10, 2, 500, 0));
        cart.recalculate();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, Money::ZERO);
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.token.as_str(), "abc");
    }

    #[test]
    fn same_selection_ignores_option_order() {
        let mut a = line(1, 10, 1, 500, 0);
        let mut b = line(2, 10, 3, 500, 0);
        a.options = vec![OptionId(2), OptionId(1)];
        b.options = vec![OptionId(1), OptionId(2)];
        assert!(a.same_selection(&b));

        b.note = Some("no onions".to_string());
        assert!(!a.same_selection(&b));
    }

    #[test]
    fn kitchen_status_transitions() {
        use KitchenStatus::*;
        assert!(Waiting.can_transition_to(Cooking));
        assert!(Cooking.can_transition_to(Done));
        assert!(Waiting.can_transition_to(Cancelled));
        assert!(Cooking.can_transition_to(Cancelled));
        assert!(Done.can_transition_to(Done));
        assert!(!Done.can_transition_to(Cooking));
        assert!(!Cancelled.can_transition_to(Waiting));
        assert!(!Waiting.can_transition_to(Done));
    }

    #[test]
    fn kitchen_status_wire_names() {
        let json = serde_json::to_string(&KitchenStatus::Cooking).expect("serialize");
        assert_eq!(json, "\"cooking\"");
        assert_eq!(
            "Canceled".parse::<KitchenStatus>().expect("parse"),
            KitchenStatus::Cancelled
        );
        assert!("burnt".parse::<KitchenStatus>().is_err());
    }

    #[test]
    fn payment_method_parsing() {
        assert_eq!(
            "bank-transfer".parse::<PaymentMethod>().expect("parse"),
            PaymentMethod::BankTransfer
        );
        assert_eq!(
            "E_Wallet".parse::<PaymentMethod>().expect("parse"),
            PaymentMethod::EWallet
        );
        let json = serde_json::to_string(&PaymentMethod::EWallet).expect("serialize");
        assert_eq!(json, "\"eWallet\"");
    }

    #[test]
    fn order_status_update_validates() {
        let mut order = Order {
            id: OrderId(7),
            code: "A-007".to_string(),
            customer_name: "Ana".to_string(),
            phone: "555".to_string(),
            email: None,
            payment_method: PaymentMethod::Cash,
            promo_code: None,
            note: None,
            items: vec![OrderItem {
                id: LineId(1),
                menu_item_id: MenuItemId(10),
                name: "Soup".to_string(),
                quantity: 1,
                unit_price: Money(400),
                extra_price: Money::ZERO,
                note: None,
                status: KitchenStatus::Waiting,
            }],
            total_amount: Money(400),
            created_at: String::new(),
        };

        assert!(!order.is_complete());
        order
            .set_item_status(LineId(1), KitchenStatus::Cooking)
            .expect("waiting -> cooking");
        assert!(matches!(
            order.set_item_status(LineId(1), KitchenStatus::Waiting),
            Err(BistroError::InvalidTransition { .. })
        ));
        assert!(matches!(
            order.set_item_status(LineId(9), KitchenStatus::Done),
            Err(BistroError::LineNotFound(LineId(9)))
        ));
        order
            .set_item_status(LineId(1), KitchenStatus::Done)
            .expect("cooking -> done");
        assert!(order.is_complete());
    }

    #[test]
    fn menu_item_defaults_to_available() {
        let json = r#"{"id":1,"name":"Tea","price":300,"categoryId":2}"#;
        let item: MenuItem = serde_json::from_str(json).expect("deserialize");
        assert!(item.is_available);
        assert!(item.option_groups.is_empty());
    }
}
