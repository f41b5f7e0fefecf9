//! # Storefront REST Client
//!
//! Typed wrapper around the storefront API. Every response is an
//! [`ApiEnvelope`]; this module unwraps it and maps transport failures.
//!
//! ## Endpoints
//!
//! - `account`: `/api/auth/*`, `/api/dashboard/summary`
//! - `catalog`: `/api/menu-items`, `/api/categories`, `/api/recipes`
//! - `cart`: `/api/cart/*` including checkout
//! - `orders`: `/api/orders/*`
//!
//! Requests carry `Authorization: Bearer <token>` when a token is set and
//! has not expired.

mod account;
mod cart;
mod catalog;
mod orders;
mod types;

pub use types::{
    AddCartItemRequest, AuthSession, CategoryUpsert, CheckoutRequest, LoginRequest, MenuItemUpsert,
    MenuQuery, OrderQuery, Paging, RecipeUpsert, RegisterRequest, ReportRange, StatusUpdate,
    UpdateCartItemRequest, UserProfile,
};

use crate::auth;
use bistro_core::{ApiEnvelope, BistroError, Page};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from the REST client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the API.
    #[error("Cannot connect to the Bistro API at {0}")]
    ConnectionFailed(String),

    /// 401: missing, invalid or expired token.
    #[error("Unauthorized: sign in again")]
    Unauthorized,

    /// 429 Too Many Requests.
    #[error("Rate limited: too many requests")]
    RateLimited,

    /// 5xx.
    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    /// A 4xx without an API envelope.
    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    /// The body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The API answered with an envelope error, or the model rejected input.
    #[error(transparent)]
    Core(#[from] BistroError),
}

/// HTTP client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given API root.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // PLUMBING
    // =========================================================================

    /// Build a request with bearer auth when a usable token is set.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.authorize(self.http.request(method, &url))
    }

    /// Like [`Self::request`], with each segment percent-encoded so opaque
    /// values (cart tokens) cannot change the route.
    fn request_segments(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let Ok(mut url) = Url::parse(&self.base_url) else {
            // Unparseable base: the send reports it as a connection failure.
            return self.request(method, &format!("/{}", segments.join("/")));
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        self.authorize(self.http.request(method, url))
    }

    fn authorize(&self, mut req: RequestBuilder) -> RequestBuilder {
        match auth::usable_token(self.token.as_deref()) {
            Some(token) => req = req.bearer_auth(token),
            None if self.token.is_some() => {
                tracing::debug!("Stored token expired; sending request anonymously");
            }
            None => {}
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check the status code and decode the envelope.
    async fn envelope<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        if status.is_server_error() {
            return Err(ClientError::Server(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        if status.is_client_error() {
            // A rejected request usually still carries an envelope with a message.
            if let Ok(envelope) = serde_json::from_slice::<ApiEnvelope<Value>>(&body)
                && !envelope.success
            {
                envelope.into_unit()?;
            }
            return Err(ClientError::Rejected(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.send(req).await?;
        Ok(self.envelope::<T>(resp).await?.into_result()?)
    }

    async fn call_unit(&self, req: RequestBuilder) -> Result<(), ClientError> {
        let resp = self.send(req).await?;
        Ok(self.envelope::<Value>(resp).await?.into_unit()?)
    }

    async fn call_page<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Page<T>, ClientError> {
        let resp = self.send(req).await?;
        Ok(self.envelope::<Vec<T>>(resp).await?.into_page()?)
    }

    async fn call_list<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Vec<T>, ClientError> {
        Ok(self.call_page(req).await?.items)
    }
}
