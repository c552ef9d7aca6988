use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{FacebookPost, Tweet};

use super::DEFAULT_LIMIT;

/// Facebook posts and tweets collected per media.
#[derive(Debug, Clone)]
pub struct SocialService {
    api: ApiClient,
}

impl SocialService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn facebook_posts(
        &self,
        media_id: u32,
        limit: impl Into<Option<u32>>,
    ) -> ApiResponse<Vec<FacebookPost>> {
        self.api
            .get(Self::by_media(Endpoint::FacebookPosts, media_id, limit.into()))
            .await
    }

    pub async fn tweets(&self, media_id: u32, limit: impl Into<Option<u32>>) -> ApiResponse<Vec<Tweet>> {
        self.api
            .get(Self::by_media(Endpoint::TwitterTweets, media_id, limit.into()))
            .await
    }

    fn by_media(endpoint: Endpoint, media_id: u32, limit: Option<u32>) -> RequestDescriptor {
        RequestDescriptor::get(endpoint)
            .param("media_id", media_id)
            .param("limit", limit.unwrap_or(DEFAULT_LIMIT))
    }
}
