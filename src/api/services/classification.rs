use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{Category, Classification, ClassificationStats, WeeklyCategoryStats};

use super::{DEFAULT_DAYS, DEFAULT_LIMIT};

#[derive(Debug, Clone)]
pub struct ClassificationService {
    api: ApiClient,
}

impl ClassificationService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_by_category(
        &self,
        category: Category,
        limit: impl Into<Option<u32>>,
    ) -> ApiResponse<Vec<Classification>> {
        let request = RequestDescriptor::get(Endpoint::Classifications)
            .param("categorie", category.label())
            .param("limit", limit.into().unwrap_or(DEFAULT_LIMIT));
        self.api.get(request).await
    }

    /// Per-category totals over the last `days` (default 30).
    pub async fn get_stats(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<ClassificationStats>> {
        let request = RequestDescriptor::get(Endpoint::ClassificationsStats)
            .param("days", days.into().unwrap_or(DEFAULT_DAYS));
        self.api.get(request).await
    }

    pub async fn get_weekly(&self) -> ApiResponse<Vec<WeeklyCategoryStats>> {
        self.api
            .get(RequestDescriptor::get(Endpoint::ClassificationsWeekly))
            .await
    }
}
