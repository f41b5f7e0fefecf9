//! # Pricing
//!
//! Validates an option selection against a menu item and computes the
//! per-unit extras and line total. The server re-prices every line; this
//! quote only drives optimistic display.

use crate::primitives::{MAX_LINE_QUANTITY, MAX_NOTE_LENGTH};
use crate::{BistroError, CartItem, LineId, MenuItem, Money, OptionGroupId, OptionId};
use std::collections::{BTreeMap, BTreeSet};

/// Priced selection for one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub unit_price: Money,
    pub extra_price: Money,
    pub quantity: u32,
    pub line_total: Money,
    pub options: Vec<OptionId>,
}

impl Quote {
    /// Turn the quote into a provisional cart line for optimistic display.
    #[must_use]
    pub fn into_cart_item(self, item: &MenuItem, note: Option<String>) -> CartItem {
        CartItem {
            id: LineId::PROVISIONAL,
            menu_item_id: item.id,
            name: item.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            extra_price: self.extra_price,
            options: self.options,
            note,
        }
    }
}

/// Check a quantity is within `1..=MAX_LINE_QUANTITY`.
pub fn validate_quantity(quantity: u32) -> Result<(), BistroError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(BistroError::InvalidInput(format!(
            "Quantity {} out of valid range 1..={}",
            quantity, MAX_LINE_QUANTITY
        )));
    }
    Ok(())
}

/// Check a line note length.
pub fn validate_note(note: Option<&str>) -> Result<(), BistroError> {
    if let Some(note) = note
        && note.len() > MAX_NOTE_LENGTH
    {
        return Err(BistroError::InvalidInput(format!(
            "Note length {} exceeds maximum {} bytes",
            note.len(),
            MAX_NOTE_LENGTH
        )));
    }
    Ok(())
}

/// Price a selection of options on a menu item.
///
/// Rules:
/// - the item must be available and the quantity in range
/// - every option must belong to the item, without duplicates
/// - required groups need at least one selection
/// - groups with `max_select > 0` cannot exceed it
pub fn quote(item: &MenuItem, selected: &[OptionId], quantity: u32) -> Result<Quote, BistroError> {
    if !item.is_available {
        return Err(BistroError::Unavailable(item.id));
    }
    validate_quantity(quantity)?;

    let mut seen = BTreeSet::new();
    let mut per_group: BTreeMap<OptionGroupId, usize> = BTreeMap::new();
    let mut extra_price = Money::ZERO;

    for &option_id in selected {
        if !seen.insert(option_id) {
            return Err(BistroError::InvalidInput(format!(
                "Option {} selected more than once",
                option_id
            )));
        }
        let (group, detail) = item.option(option_id).ok_or(BistroError::UnknownOption {
            item: item.id,
            option: option_id,
        })?;
        *per_group.entry(group.id).or_insert(0) += 1;
        extra_price = extra_price.saturating_add(detail.extra_price);
    }

    for group in &item.option_groups {
        let count = per_group.get(&group.id).copied().unwrap_or(0);
        if group.required && count == 0 {
            return Err(BistroError::MissingRequiredOption {
                group: group.name.clone(),
            });
        }
        if group.max_select > 0 && count > group.max_select as usize {
            return Err(BistroError::TooManyOptions {
                group: group.name.clone(),
                max: group.max_select,
                got: count,
            });
        }
    }

    let unit_price = item.price;
    Ok(Quote {
        unit_price,
        extra_price,
        quantity,
        line_total: unit_price.saturating_add(extra_price).times(quantity),
        options: selected.to_vec(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
