// Integration tests for the catalog's mutations against a mock backend:
// declared invalidations, retry behaviour and notifications.

use std::time::Duration;

use mediawatch::api::types::{ScrapeOptions, ScrapingRequest, Stats};
use mediawatch::prelude::*;
use mediawatch::queries::keys;
use mediawatch::subscription::http::NotificationLevel;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_for(server: &MockServer) -> Catalog {
    let api = ApiClient::new(ApiConfig::new(server.uri(), Duration::from_secs(5)));
    let config = QueryConfig::new(Duration::from_secs(60), Duration::from_secs(300));
    Catalog::new(api, QueryClient::with_config(config))
}

fn stats_body() -> serde_json::Value {
    json!({
        "total_medias": 12,
        "total_articles": 340,
        "total_categories": 8,
        "period_days": 30
    })
}

async fn mount_stats(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/api/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(expected)
        .mount(server)
        .await;
}

fn scraping_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "message": "Scraping started",
        "total_articles": 5
    }))
}

#[tokio::test]
async fn successful_trigger_invalidates_declared_queries() {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/trigger/"))
        .and(body_json(json!({"url": "https://lefaso.net"})))
        .respond_with(scraping_ok())
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let stats = catalog.stats(None);
    let mut notifications = catalog.client().notifications();

    stats.fetch().await.ok();
    stats.fetch().await.ok();
    assert!(catalog.client().get_query_data::<Stats>(stats.key()).is_some());

    let request = ScrapingRequest {
        url: Some("https://lefaso.net".to_string()),
        ..ScrapingRequest::default()
    };
    let response = catalog.trigger().mutate(catalog.client(), request).await;
    assert_eq!(response.map(|r| r.total_articles), Ok(5));
    assert!(catalog.client().get_query_data::<Stats>(stats.key()).is_none());

    let notification = notifications.try_recv().ok();
    assert_eq!(notification.map(|n| n.level), Some(NotificationLevel::Success));

    // Invalidated: the next read goes back to the server.
    assert!(stats.fetch().await.is_ok());
}

#[tokio::test]
async fn scrape_all_failure_is_not_retried_and_leaves_cache() {
    let server = MockServer::start().await;
    mount_stats(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/trigger/"))
        .and(body_json(json!({"all": true, "days": 7})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "queue full"})))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let stats = catalog.stats(None);
    stats.fetch().await.ok();
    let mut notifications = catalog.client().notifications();

    let options = ScrapeOptions {
        days: Some(7),
        ..ScrapeOptions::default()
    };
    let error = catalog.scrape_all().mutate(catalog.client(), options).await.err();

    assert_eq!(error.as_ref().and_then(QueryError::status), Some(500));
    assert_eq!(error.map(|e| e.to_string()), Some("queue full".to_string()));
    assert!(catalog.client().get_query_data::<Stats>(stats.key()).is_some());
    assert_eq!(
        notifications.try_recv().ok(),
        Some(Notification::error("Error", "queue full"))
    );
}

#[tokio::test]
async fn scrape_media_retries_a_server_error_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/trigger/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "busy"})))
        .expect(2)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let mut notifications = catalog.client().notifications();
    let input = ScrapeMedia {
        url: "https://burkina24.com".to_string(),
        options: ScrapeOptions::default(),
    };

    assert!(catalog.scrape_media().mutate(catalog.client(), input).await.is_err());
    assert_eq!(
        notifications.try_recv().ok(),
        Some(Notification::error("Error", "busy"))
    );
}

#[tokio::test]
async fn toggle_notification_follows_new_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/schedule/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "ok"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let mut notifications = catalog.client().notifications();
    let toggle = catalog.toggle_schedule();

    assert!(toggle.mutate(catalog.client(), true).await.is_ok());
    assert_eq!(
        notifications.try_recv().ok().map(|n| n.title),
        Some("Automation enabled".to_string())
    );

    assert!(toggle.mutate(catalog.client(), false).await.is_ok());
    assert_eq!(
        notifications.try_recv().ok().map(|n| n.title),
        Some("Automation disabled".to_string())
    );
}

#[tokio::test]
async fn schedule_update_refreshes_schedule_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/schedule/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "enabled": false})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/schedule/"))
        .and(body_json(json!({"id": 1, "enabled": true, "frequency": "daily"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success", "message": "saved"})))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let current = catalog.scraping_schedule().fetch().await.unwrap_or_default();
    assert_eq!(current.frequency, mediawatch::api::types::Frequency::Daily);

    let updated = catalog
        .update_schedule()
        .mutate(catalog.client(), current.toggled(true))
        .await;
    assert!(updated.is_ok());
    assert_eq!(
        catalog.update_schedule().invalidated_keys(),
        [keys::SCRAPING_SCHEDULE]
    );

    assert!(catalog.scraping_schedule().fetch().await.is_ok());
}

#[tokio::test]
async fn observe_reports_loading_then_outcome() {
    use futures::StreamExt;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/trigger/"))
        .respond_with(scraping_ok())
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let states: Vec<_> = catalog
        .scrape_all()
        .observe(catalog.client().clone(), ScrapeOptions::default())
        .collect()
        .await;

    assert_eq!(states.len(), 2);
    assert!(states[0].is_loading());
    assert_eq!(states[1].data().map(|r| r.status.as_str()), Some("success"));
}
