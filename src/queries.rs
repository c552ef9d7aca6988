//! The dashboard's queries and mutations, wired to the API services.
//!
//! [`Catalog`] pairs an [`ApiClient`] with a [`QueryClient`] and builds the
//! cached queries the panels subscribe to, plus the mutations behind the
//! scraping controls. Each mutation declares the query names it invalidates:
//!
//! | mutation          | invalidates                                              |
//! |-------------------|----------------------------------------------------------|
//! | `trigger`         | `articles`, `stats`, `classifications`                   |
//! | `scrape_media`    | `articles`, `stats`                                      |
//! | `scrape_all`      | `articles`, `stats`, `classifications`, `scraping-history` |
//! | `update_schedule` | `scraping-schedule`                                      |
//! | `toggle_schedule` | `scraping-schedule`                                      |
//! | `delete_schedule` | `scraping-schedule`                                      |

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::api::types::{
    Article, ArticleParams, AudienceGlobal, ClassificationStats, HealthCheck, HistoryParams, Media, Ranking,
    ScheduleResponse, ScrapeOptions, ScrapingHistory, ScrapingRequest, ScrapingResponse, ScrapingSchedule, Stats,
};
use crate::api::{ApiClient, ApiResponse};
use crate::subscription::http::{Mutation, Notification, Query, QueryClient, QueryError, QueryKey};

/// Query names, shared by queries and the invalidation lists.
pub mod keys {
    pub const MEDIAS: &str = "medias";
    pub const ARTICLES: &str = "articles";
    pub const CLASSIFICATIONS: &str = "classifications";
    pub const STATS: &str = "stats";
    pub const RANKING: &str = "ranking";
    pub const AUDIENCE: &str = "audience";
    pub const HEALTH: &str = "health";
    pub const SCRAPING_SCHEDULE: &str = "scraping-schedule";
    pub const SCRAPING_HISTORY: &str = "scraping-history";
}

/// How often the scraping history is polled while the dashboard is visible.
pub const HISTORY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Input of [`Catalog::scrape_media`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeMedia {
    pub url: String,
    pub options: ScrapeOptions,
}

/// Turns a service call into a query fetcher.
fn fetcher<T, F, Fut>(
    api: &ApiClient,
    call: F,
) -> impl Fn() -> BoxFuture<'static, Result<T, QueryError>> + Send + Sync + 'static
where
    T: Send + 'static,
    F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResponse<T>> + Send + 'static,
{
    let api = api.clone();
    move || {
        let response = call(api.clone());
        Box::pin(async move { response.await.into_result().map_err(QueryError::from) })
    }
}

/// Turns a service call taking an input into a mutator.
fn mutator<I, T, F, Fut>(
    api: &ApiClient,
    call: F,
) -> impl Fn(I) -> BoxFuture<'static, Result<T, QueryError>> + Send + Sync + 'static
where
    I: 'static,
    T: Send + 'static,
    F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResponse<T>> + Send + 'static,
{
    let api = api.clone();
    move |input| {
        let response = call(api.clone(), input);
        Box::pin(async move { response.await.into_result().map_err(QueryError::from) })
    }
}

/// Builds the dashboard's queries and mutations.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
    client: QueryClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient, client: QueryClient) -> Self {
        Self { api, client }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn client(&self) -> &QueryClient {
        &self.client
    }

    #[must_use]
    pub fn medias(&self) -> Query<Vec<Media>> {
        Query::new(
            keys::MEDIAS,
            fetcher(&self.api, |api| async move { api.media().get_all().await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn articles(&self, params: ArticleParams) -> Query<Vec<Article>> {
        Query::new(
            QueryKey::new(keys::ARTICLES).with_params(&params),
            fetcher(&self.api, move |api| async move { api.articles().get_all(params).await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn classification_stats(&self, days: Option<u32>) -> Query<Vec<ClassificationStats>> {
        Query::new(
            QueryKey::new(keys::CLASSIFICATIONS).with_params(&days),
            fetcher(&self.api, move |api| async move { api.classifications().get_stats(days).await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn stats(&self, days: Option<u32>) -> Query<Stats> {
        Query::new(
            QueryKey::new(keys::STATS).with_params(&days),
            fetcher(&self.api, move |api| async move { api.stats().get(days).await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn ranking(&self, days: Option<u32>) -> Query<Vec<Ranking>> {
        Query::new(
            QueryKey::new(keys::RANKING).with_params(&days),
            fetcher(&self.api, move |api| async move { api.ranking().get(days).await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn global_audience(&self, days: Option<u32>) -> Query<Vec<AudienceGlobal>> {
        Query::new(
            QueryKey::new(keys::AUDIENCE).with_params(&days),
            fetcher(&self.api, move |api| async move { api.audience().get_global(days).await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn health(&self) -> Query<HealthCheck> {
        Query::new(
            keys::HEALTH,
            fetcher(&self.api, |api| async move { api.stats().health().await }),
            self.client.clone(),
        )
    }

    #[must_use]
    pub fn scraping_schedule(&self) -> Query<ScrapingSchedule> {
        Query::new(
            keys::SCRAPING_SCHEDULE,
            fetcher(&self.api, |api| async move { api.scraping().get_schedule().await }),
            self.client.clone(),
        )
    }

    /// The task history, polled every [`HISTORY_POLL_INTERVAL`].
    #[must_use]
    pub fn scraping_history(&self, params: HistoryParams) -> Query<ScrapingHistory> {
        Query::new(
            QueryKey::new(keys::SCRAPING_HISTORY).with_params(&params),
            fetcher(&self.api, move |api| async move { api.scraping().get_history(params).await }),
            self.client.clone(),
        )
        .refetch_interval(HISTORY_POLL_INTERVAL)
    }

    #[must_use]
    pub fn trigger(&self) -> Mutation<ScrapingRequest, ScrapingResponse> {
        Mutation::new(
            "trigger-scraping",
            mutator(&self.api, |api, request: ScrapingRequest| async move {
                api.scraping().trigger(&request).await
            }),
        )
        .invalidates([keys::ARTICLES, keys::STATS, keys::CLASSIFICATIONS])
        .notify_success("Success", "Scraping started")
        .notify_error("Error", "Failed to start scraping")
    }

    #[must_use]
    pub fn scrape_media(&self) -> Mutation<ScrapeMedia, ScrapingResponse> {
        Mutation::new(
            "scrape-media",
            mutator(&self.api, |api, input: ScrapeMedia| async move {
                api.scraping().scrape_media(input.url, input.options).await
            }),
        )
        .invalidates([keys::ARTICLES, keys::STATS])
        .notify_success("Success", "Media scraping started")
        .notify_error("Error", "Failed to scrape media")
    }

    /// Scrapes every media. A bulk run is expensive, so it is never retried.
    /// Only failures are notified.
    #[must_use]
    pub fn scrape_all(&self) -> Mutation<ScrapeOptions, ScrapingResponse> {
        Mutation::new(
            "scrape-all",
            mutator(&self.api, |api, options: ScrapeOptions| async move {
                api.scraping().scrape_all(options).await
            }),
        )
        .invalidates([
            keys::ARTICLES,
            keys::STATS,
            keys::CLASSIFICATIONS,
            keys::SCRAPING_HISTORY,
        ])
        .without_retry()
        .notify_error("Error", "Failed to scrape all media")
    }

    #[must_use]
    pub fn update_schedule(&self) -> Mutation<ScrapingSchedule, ScheduleResponse> {
        Mutation::new(
            "update-schedule",
            mutator(&self.api, |api, schedule: ScrapingSchedule| async move {
                api.scraping().update_schedule(&schedule).await
            }),
        )
        .invalidates([keys::SCRAPING_SCHEDULE])
        .notify_success("Success", "Automation updated")
        .notify_error("Error", "Failed to update automation")
    }

    #[must_use]
    pub fn toggle_schedule(&self) -> Mutation<bool, ScheduleResponse> {
        Mutation::new(
            "toggle-schedule",
            mutator(&self.api, |api, enabled: bool| async move {
                api.scraping().toggle_schedule(enabled).await
            }),
        )
        .invalidates([keys::SCRAPING_SCHEDULE])
        .notify_success_with(|enabled| {
            if *enabled {
                Notification::success(
                    "Automation enabled",
                    "Scraping will run automatically at the configured frequency",
                )
            } else {
                Notification::success("Automation disabled", "Automatic scraping has been disabled")
            }
        })
        .notify_error("Error", "Failed to change the automation state")
    }

    #[must_use]
    pub fn delete_schedule(&self) -> Mutation<(), Option<ScheduleResponse>> {
        Mutation::new(
            "delete-schedule",
            mutator(&self.api, |api, (): ()| async move { api.scraping().delete_schedule().await }),
        )
        .invalidates([keys::SCRAPING_SCHEDULE])
        .notify_success("Success", "Automation removed")
        .notify_error("Error", "Failed to remove the automation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::subscription::SubscriptionSource;

    fn catalog() -> Catalog {
        Catalog::new(ApiClient::new(ApiConfig::default()), QueryClient::new())
    }

    #[test]
    fn test_invalidation_lists() {
        let catalog = catalog();
        assert_eq!(catalog.trigger().invalidated_keys(), ["articles", "stats", "classifications"]);
        assert_eq!(catalog.scrape_media().invalidated_keys(), ["articles", "stats"]);
        assert_eq!(
            catalog.scrape_all().invalidated_keys(),
            ["articles", "stats", "classifications", "scraping-history"]
        );
        assert_eq!(catalog.update_schedule().invalidated_keys(), ["scraping-schedule"]);
        assert_eq!(catalog.toggle_schedule().invalidated_keys(), ["scraping-schedule"]);
        assert_eq!(catalog.delete_schedule().invalidated_keys(), ["scraping-schedule"]);
    }

    #[test]
    fn test_retry_policies() {
        let catalog = catalog();
        assert!(!catalog.scrape_all().retry_policy().is_enabled());
        assert_eq!(catalog.trigger().retry_policy().max_retries, 1);
    }

    #[test]
    fn test_parameterized_keys() {
        let catalog = catalog();
        let first = catalog.scraping_history(HistoryParams { limit: Some(10), offset: Some(0) });
        let second = catalog.scraping_history(HistoryParams { limit: Some(10), offset: Some(10) });
        assert_ne!(first.key(), second.key());
        assert_ne!(first.id(), second.id());
        assert!(first.key().matches(keys::SCRAPING_HISTORY));

        assert_eq!(catalog.stats(None).key(), &QueryKey::new("stats"));
        assert_eq!(catalog.stats(Some(7)).key().params(), Some("7"));
    }
}
