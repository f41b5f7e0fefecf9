//! # Response Envelope
//!
//! Every storefront endpoint wraps its payload in the same shape:
//!
//! ```text
//! { "success": bool, "message": string?, "result": T?, "metadata": PageMeta? }
//! ```

use crate::BistroError;
use serde::{Deserialize, Serialize};

/// Pagination details attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl PageMeta {
    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Uniform API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<T>,
    #[serde(default)]
    pub metadata: Option<PageMeta>,
}

/// A page of results with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Option<PageMeta>,
}

impl<T> ApiEnvelope<T> {
    /// Build a successful envelope.
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            message: None,
            result: Some(result),
            metadata: None,
        }
    }

    /// Build a failed envelope carrying a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            result: None,
            metadata: None,
        }
    }

    fn check(&self) -> Result<(), BistroError> {
        if self.success {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        Err(BistroError::Api(message))
    }

    /// Unwrap the payload, turning `success = false` and a missing result into errors.
    pub fn into_result(self) -> Result<T, BistroError> {
        self.check()?;
        self.result.ok_or(BistroError::EmptyResult)
    }

    /// For calls whose payload is irrelevant (deletes, status updates).
    pub fn into_unit(self) -> Result<(), BistroError> {
        self.check()
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    /// Unwrap a list payload together with its metadata.
    /// A successful response with no result is an empty page.
    pub fn into_page(self) -> Result<Page<T>, BistroError> {
        self.check()?;
        Ok(Page {
            items: self.result.unwrap_or_default(),
            meta: self.metadata,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_result() {
        let json = r#"{"success":true,"result":42}"#;
        let env: ApiEnvelope<u32> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(env.into_result().expect("result"), 42);
    }

    #[test]
    fn failure_carries_message() {
        let json = r#"{"success":false,"message":"Promo code expired"}"#;
        let env: ApiEnvelope<u32> = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(env.into_result(), Err(BistroError::Api(m)) if m == "Promo code expired"));
    }

    #[test]
    fn failure_without_message_gets_generic_text() {
        let env: ApiEnvelope<u32> = ApiEnvelope {
            success: false,
            message: Some("  ".to_string()),
            result: None,
            metadata: None,
        };
        assert!(matches!(env.into_result(), Err(BistroError::Api(m)) if m == "Request failed"));
    }

    #[test]
    fn success_without_result_is_empty_result() {
        let env: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success":true}"#).expect("deserialize");
        assert!(matches!(env.into_result(), Err(BistroError::EmptyResult)));

        let env: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success":true}"#).expect("deserialize");
        assert!(env.into_unit().is_ok());
    }

    #[test]
    fn page_keeps_metadata() {
        let json = r#"{"success":true,"result":[1,2],"metadata":{"page":1,"pageSize":2,"totalCount":5,"totalPages":3}}"#;
        let env: ApiEnvelope<Vec<u32>> = serde_json::from_str(json).expect("deserialize");
        let page = env.into_page().expect("page");
        assert_eq!(page.items, vec![1, 2]);
        let meta = page.meta.expect("meta");
        assert_eq!(meta.total_count, 5);
        assert!(meta.has_next());
    }
}
