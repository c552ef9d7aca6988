use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{HealthCheck, Stats};

use super::DEFAULT_DAYS;

#[derive(Debug, Clone)]
pub struct StatsService {
    api: ApiClient,
}

impl StatsService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, days: impl Into<Option<u32>>) -> ApiResponse<Stats> {
        let request =
            RequestDescriptor::get(Endpoint::Stats).param("days", days.into().unwrap_or(DEFAULT_DAYS));
        self.api.get(request).await
    }

    pub async fn health(&self) -> ApiResponse<HealthCheck> {
        self.api.get(RequestDescriptor::get(Endpoint::Health)).await
    }
}
