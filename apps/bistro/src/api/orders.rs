use super::{ApiClient, ClientError, OrderQuery, StatusUpdate};
use bistro_core::{KitchenStatus, LineId, Order, OrderId, Page};
use reqwest::Method;

impl ApiClient {
    /// GET /api/orders
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>, ClientError> {
        let req = self
            .request(Method::GET, "/api/orders")
            .query(&query.params());
        self.call_page(req).await
    }

    /// GET /api/orders/{id}
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        let req = self.request(Method::GET, &format!("/api/orders/{}", id));
        self.call(req).await
    }

    /// PUT /api/orders/{id}/items/{itemId}/status
    pub async fn update_item_status(
        &self,
        order: OrderId,
        item: LineId,
        status: KitchenStatus,
    ) -> Result<(), ClientError> {
        let req = self
            .request(
                Method::PUT,
                &format!("/api/orders/{}/items/{}/status", order, item),
            )
            .json(&StatusUpdate { status });
        self.call_unit(req).await
    }
}
