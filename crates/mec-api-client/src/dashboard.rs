//! Dashboard summary endpoint.

use mec_core::DashboardSummary;

use crate::error::ApiError;
use crate::AdminApiClient;

impl AdminApiClient {
    /// Fetch the combined count summary.
    ///
    /// Calls `GET {base_url}/dashboard`. Domains missing from the response
    /// decode as zero.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        let endpoint = "GET /dashboard";
        let url = self.url("dashboard");

        let envelope = self.send(endpoint, self.http.get(&url)).await?;
        match envelope.data {
            Some(data) => serde_json::from_value(data).map_err(|e| ApiError::Payload {
                endpoint: endpoint.into(),
                source: e,
            }),
            None => Ok(DashboardSummary::default()),
        }
    }
}
