// Integration tests for the defaults the resource services apply when an
// argument is omitted.

use std::time::Duration;

use mediawatch::api::types::{ArticleParams, Category};
use mediawatch::api::{ApiClient, ApiConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri(), Duration::from_secs(5)))
}

fn empty_list() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([]))
}

#[tokio::test]
async fn recent_articles_default_to_a_week() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/"))
        .and(query_param("days", "7"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("media_id"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).articles().get_recent(None, None).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn unset_article_filters_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/"))
        .and(query_param("media_id", "4"))
        .and(query_param_is_missing("days"))
        .and(query_param_is_missing("limit"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&server)
        .await;

    let params = ArticleParams {
        media_id: Some(4),
        ..ArticleParams::default()
    };
    let response = client_for(&server).articles().get_all(params).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn category_is_sent_with_its_accented_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/classifications/"))
        .and(query_param("categorie", "Économie"))
        .and(query_param("limit", "100"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .classifications()
        .get_by_category(Category::Economie, None)
        .await;
    assert!(response.is_success());
}

#[tokio::test]
async fn tweets_use_the_default_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/twitter/tweets/"))
        .and(query_param("media_id", "3"))
        .and(query_param("limit", "100"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).social().tweets(3, None).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn ranking_defaults_to_thirty_days() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ranking/"))
        .and(query_param("days", "30"))
        .respond_with(empty_list())
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).ranking().get(None).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn inactive_media_default_threshold_is_a_week() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audience/inactive/"))
        .and(query_param("days_threshold", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"web": [], "twitter": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).audience().get_inactive(None).await;
    let inactive = response.data().cloned().unwrap_or_default();
    assert!(inactive.web.is_empty());
    assert!(inactive.facebook.is_empty());
}

#[tokio::test]
async fn media_detail_uses_the_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/medias/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "nom": "Lefaso.net",
            "url": "https://lefaso.net",
            "type_site": "web",
            "actif": true,
            "created_at": "2025-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).media().get_by_id(12).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.data().map(|media| media.nom.as_str()), Some("Lefaso.net"));
}
