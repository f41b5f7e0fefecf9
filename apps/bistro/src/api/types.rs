//! Request and response bodies of the storefront API that are not part of
//! the shared model.

use bistro_core::{
    CategoryId, Ingredient, KitchenStatus, MenuItem, MenuItemId, Money, OptionGroup, OptionId,
    PaymentMethod, primitives::MAX_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNT
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// Result of login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

// =============================================================================
// CART & CHECKOUT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub options: Vec<OptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: KitchenStatus,
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpsert {
    pub name: String,
    pub price: Money,
    pub category_id: CategoryId,
    pub description: Option<String>,
    pub is_available: bool,
    pub option_groups: Vec<OptionGroup>,
}

impl From<&MenuItem> for MenuItemUpsert {
    fn from(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            category_id: item.category_id,
            description: item.description.clone(),
            is_available: item.is_available,
            option_groups: item.option_groups.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUpsert {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpsert {
    pub menu_item_id: MenuItemId,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Option<String>,
}

// =============================================================================
// QUERIES
// =============================================================================

/// Pagination shared by list endpoints. Page size is clamped to the API maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Paging {
    fn push(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(page) = self.page {
            params.push(("page", page.max(1).to_string()));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.clamp(1, MAX_PAGE_SIZE).to_string()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuQuery {
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub paging: Paging,
}

impl MenuQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category_id {
            params.push(("categoryId", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        self.paging.push(&mut params);
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderQuery {
    pub status: Option<KitchenStatus>,
    pub paging: Paging,
}

impl OrderQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.name().to_string()));
        }
        self.paging.push(&mut params);
        params
    }
}

/// Reporting window for the dashboard, as `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ReportRange {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = &self.from {
            params.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            params.push(("to", to.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_query_params() {
        let query = MenuQuery {
            category_id: Some(CategoryId(3)),
            search: Some("  ".to_string()),
            paging: Paging {
                page: Some(0),
                page_size: Some(5_000),
            },
        };
        assert_eq!(
            query.params(),
            vec![
                ("categoryId", "3".to_string()),
                ("page", "1".to_string()),
                ("pageSize", MAX_PAGE_SIZE.to_string()),
            ]
        );
    }

    #[test]
    fn checkout_body_is_camel_case() {
        let body = CheckoutRequest {
            customer_name: "Ada".to_string(),
            phone: "555".to_string(),
            email: None,
            payment_method: PaymentMethod::BankTransfer,
            promo_code: Some("SPRING".to_string()),
            note: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "customerName": "Ada",
                "phone": "555",
                "paymentMethod": "bankTransfer",
                "promoCode": "SPRING"
            })
        );
    }
}
