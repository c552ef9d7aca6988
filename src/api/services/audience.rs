use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{AudienceFacebook, AudienceGlobal, AudienceTwitter, AudienceWeb, InactiveMedias};

use super::DEFAULT_DAYS;

const DEFAULT_INACTIVE_THRESHOLD: u32 = 7;

/// Audience analysis per platform. Every listing defaults to the last 30 days.
#[derive(Debug, Clone)]
pub struct AudienceService {
    api: ApiClient,
}

impl AudienceService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_web(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<AudienceWeb>> {
        self.api.get(Self::window(Endpoint::AudienceWeb, days.into())).await
    }

    pub async fn get_facebook(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<AudienceFacebook>> {
        self.api
            .get(Self::window(Endpoint::AudienceFacebook, days.into()))
            .await
    }

    pub async fn get_twitter(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<AudienceTwitter>> {
        self.api
            .get(Self::window(Endpoint::AudienceTwitter, days.into()))
            .await
    }

    /// All platforms combined, with an influence score per media.
    pub async fn get_global(&self, days: impl Into<Option<u32>>) -> ApiResponse<Vec<AudienceGlobal>> {
        self.api
            .get(Self::window(Endpoint::AudienceGlobal, days.into()))
            .await
    }

    /// Media with no publication for at least `days_threshold` days (default 7).
    pub async fn get_inactive(&self, days_threshold: impl Into<Option<u32>>) -> ApiResponse<InactiveMedias> {
        let request = RequestDescriptor::get(Endpoint::AudienceInactive).param(
            "days_threshold",
            days_threshold.into().unwrap_or(DEFAULT_INACTIVE_THRESHOLD),
        );
        self.api.get(request).await
    }

    fn window(endpoint: Endpoint, days: Option<u32>) -> RequestDescriptor {
        RequestDescriptor::get(endpoint).param("days", days.unwrap_or(DEFAULT_DAYS))
    }
}
