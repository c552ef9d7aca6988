use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::Ranking;

use super::DEFAULT_DAYS;

#[derive(Debug, Clone)]
pub struct RankingService {
    api: ApiClient,
}

impl RankingService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Media ranked by influence over the last `days` (default 30).
    pub async fn get(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<Ranking>> {
        let request =
            RequestDescriptor::get(Endpoint::Ranking).param("days", days.into().unwrap_or(DEFAULT_DAYS));
        self.api.get(request).await
    }
}
