use crate::api::endpoints::Endpoint;
use crate::api::transport::{ApiClient, ApiResponse, RequestDescriptor};
use crate::api::types::{
    HistoryParams, ScheduleResponse, ScrapeOptions, ScrapingHistory, ScrapingRequest, ScrapingResponse,
    ScrapingSchedule,
};

/// Manual scraping triggers, the recurring schedule and the task history.
///
/// The scraping jobs themselves run on the backend; this service only
/// starts them and reads their records.
#[derive(Debug, Clone)]
pub struct ScrapingService {
    api: ApiClient,
}

#[derive(serde::Serialize)]
struct ToggleBody {
    enabled: bool,
}

impl ScrapingService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn trigger(&self, request: &ScrapingRequest) -> ApiResponse<ScrapingResponse> {
        self.api.post(Endpoint::ScrapingTrigger, request).await
    }

    /// Scrapes a single media site identified by its URL.
    pub async fn scrape_media(&self, url: impl Into<String>, options: ScrapeOptions) -> ApiResponse<ScrapingResponse> {
        let request = ScrapingRequest {
            url: Some(url.into()),
            all: Some(false),
            days: options.days,
            fb_posts: options.fb_posts,
            tweets: options.tweets,
            skip_facebook: options.skip_facebook,
            skip_twitter: options.skip_twitter,
        };
        self.trigger(&request).await
    }

    /// Scrapes every registered media. The skip flags of `options` are ignored.
    pub async fn scrape_all(&self, options: ScrapeOptions) -> ApiResponse<ScrapingResponse> {
        let request = ScrapingRequest {
            all: Some(true),
            days: options.days,
            fb_posts: options.fb_posts,
            tweets: options.tweets,
            ..ScrapingRequest::default()
        };
        self.trigger(&request).await
    }

    pub async fn get_schedule(&self) -> ApiResponse<ScrapingSchedule> {
        self.api
            .get(RequestDescriptor::get(Endpoint::ScrapingSchedule))
            .await
    }

    pub async fn update_schedule(&self, schedule: &ScrapingSchedule) -> ApiResponse<ScheduleResponse> {
        self.api.post(Endpoint::ScrapingSchedule, schedule).await
    }

    /// Enables or disables the schedule, sending only `{"enabled": ...}` so
    /// the stored frequency is left as is.
    pub async fn toggle_schedule(&self, enabled: bool) -> ApiResponse<ScheduleResponse> {
        self.api
            .post(Endpoint::ScrapingSchedule, &ToggleBody { enabled })
            .await
    }

    /// Removes the schedule. A body-less answer decodes as `None`.
    pub async fn delete_schedule(&self) -> ApiResponse<Option<ScheduleResponse>> {
        self.api.delete(Endpoint::ScrapingSchedule).await
    }

    pub async fn get_history(&self, params: HistoryParams) -> ApiResponse<ScrapingHistory> {
        let request = RequestDescriptor::get(Endpoint::ScrapingHistory)
            .param_opt("limit", params.limit)
            .param_opt("offset", params.offset);
        self.api.get(request).await
    }
}
