//! Anonymous carts, keyed by cart token, and checkout.

use super::{AddCartItemRequest, ApiClient, CheckoutRequest, ClientError, UpdateCartItemRequest};
use bistro_core::{Cart, CartToken, LineId, Order};
use reqwest::{Method, RequestBuilder};

impl ApiClient {
    /// `/api/cart/{token}/...` with the token as a single encoded segment.
    fn cart_request(&self, method: Method, token: &CartToken, rest: &[&str]) -> RequestBuilder {
        let mut segments = vec!["api", "cart", token.as_str()];
        segments.extend_from_slice(rest);
        self.request_segments(method, &segments)
    }

    /// POST /api/cart: open a new empty cart and receive its token.
    pub async fn create_cart(&self) -> Result<Cart, ClientError> {
        let req = self.request(Method::POST, "/api/cart");
        self.call(req).await
    }

    /// GET /api/cart/{token}
    pub async fn get_cart(&self, token: &CartToken) -> Result<Cart, ClientError> {
        let req = self.cart_request(Method::GET, token, &[]);
        self.call(req).await
    }

    /// POST /api/cart/{token}/items
    pub async fn add_cart_item(
        &self,
        token: &CartToken,
        body: &AddCartItemRequest,
    ) -> Result<Cart, ClientError> {
        let req = self
            .cart_request(Method::POST, token, &["items"])
            .json(body);
        self.call(req).await
    }

    /// PUT /api/cart/{token}/items/{lineId}
    pub async fn update_cart_item(
        &self,
        token: &CartToken,
        line: LineId,
        body: &UpdateCartItemRequest,
    ) -> Result<Cart, ClientError> {
        let req = self
            .cart_request(Method::PUT, token, &["items", line.to_string().as_str()])
            .json(body);
        self.call(req).await
    }

    /// DELETE /api/cart/{token}/items/{lineId}
    pub async fn remove_cart_item(
        &self,
        token: &CartToken,
        line: LineId,
    ) -> Result<Cart, ClientError> {
        let req = self.cart_request(Method::DELETE, token, &["items", line.to_string().as_str()]);
        self.call(req).await
    }

    /// DELETE /api/cart/{token}
    pub async fn clear_cart(&self, token: &CartToken) -> Result<(), ClientError> {
        let req = self.cart_request(Method::DELETE, token, &[]);
        self.call_unit(req).await
    }

    /// POST /api/cart/{token}/checkout: turn the cart into an order.
    pub async fn checkout(
        &self,
        token: &CartToken,
        body: &CheckoutRequest,
    ) -> Result<Order, ClientError> {
        let req = self
            .cart_request(Method::POST, token, &["checkout"])
            .json(body);
        self.call(req).await
    }
}
