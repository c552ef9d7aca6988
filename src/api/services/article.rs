use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{Article, ArticleParams};

use super::DEFAULT_LIMIT;

const DEFAULT_RECENT_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct ArticleService {
    api: ApiClient,
}

impl ArticleService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists articles; unset filters are not sent.
    pub async fn get_all(&self, params: ArticleParams) -> ApiResponse<Vec<Article>> {
        let request = RequestDescriptor::get(Endpoint::Articles)
            .param_opt("media_id", params.media_id)
            .param_opt("days", params.days)
            .param_opt("limit", params.limit);
        self.api.get(request).await
    }

    pub async fn get_by_media(
        &self,
        media_id: u32,
        limit: impl Into<Option<u32>>,
    ) -> ApiResponse<Vec<Article>> {
        self.get_all(ArticleParams {
            media_id: Some(media_id),
            days: None,
            limit: Some(limit.into().unwrap_or(DEFAULT_LIMIT)),
        })
        .await
    }

    pub async fn get_recent(
        &self,
        days: impl Into<Option<u32>>,
        limit: impl Into<Option<u32>>,
    ) -> ApiResponse<Vec<Article>> {
        self.get_all(ArticleParams {
            media_id: None,
            days: Some(days.into().unwrap_or(DEFAULT_RECENT_DAYS)),
            limit: Some(limit.into().unwrap_or(DEFAULT_LIMIT)),
        })
        .await
    }
}
