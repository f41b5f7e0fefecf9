use super::{ApiClient, AuthSession, ClientError, LoginRequest, RegisterRequest, ReportRange};
use bistro_core::DashboardReport;
use reqwest::Method;

impl ApiClient {
    /// POST /api/auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ClientError> {
        let req = self.request(Method::POST, "/api/auth/login").json(request);
        self.call(req).await
    }

    /// POST /api/auth/register
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ClientError> {
        let req = self.request(Method::POST, "/api/auth/register").json(request);
        self.call(req).await
    }

    /// GET /api/dashboard/summary
    pub async fn dashboard(&self, range: &ReportRange) -> Result<DashboardReport, ClientError> {
        let req = self
            .request(Method::GET, "/api/dashboard/summary")
            .query(&range.params());
        self.call(req).await
    }
}
