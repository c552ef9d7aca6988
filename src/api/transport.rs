//! HTTP transport for the monitoring API.
//!
//! [`ApiClient`] is the only place that talks to the network. Every call
//! resolves to an [`ApiResponse`]: there is no error path that escapes as a
//! `Result::Err` or a panic. Timeouts, connection failures and non-2xx
//! statuses are all folded into [`ApiResponse::Failure`] carrying an
//! [`ApiError`] with a human-readable message and a numeric status code.
//!
//! # Status codes
//!
//! - `0` means no HTTP response was received (DNS, refused connection, ...)
//! - `408` means the client-side timeout expired
//! - anything else is the status the server actually returned
//!
//! # Example
//!
//! ```rust,no_run
//! use mediawatch::api::{ApiClient, ApiConfig, Endpoint, RequestDescriptor};
//!
//! # async fn demo() {
//! let client = ApiClient::new(ApiConfig::default());
//! let request = RequestDescriptor::get(Endpoint::Ranking).param("days", 30_u32);
//! let response = client.request::<serde_json::Value>(&request).await;
//! println!("{response:?}");
//! # }
//! ```

use std::fmt;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

use super::endpoints::Endpoint;

/// Status code used when no HTTP response was received.
pub const STATUS_NO_RESPONSE: u16 = 0;

/// Status code used when the client-side timeout expired.
pub const STATUS_TIMEOUT: u16 = 408;

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client gave up waiting for the server.
    Timeout,
    /// No HTTP response was received.
    Network,
    /// The server answered with a non-2xx status.
    Http,
    /// Anything else, e.g. a success body that could not be decoded.
    Unknown,
}

/// A normalized request failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: u16,
}

impl ApiError {
    /// Client-side timeout (`408`).
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: "Request timeout".to_string(),
            status: STATUS_TIMEOUT,
        }
    }

    /// Network-level failure (`0`).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            status: STATUS_NO_RESPONSE,
        }
    }

    /// Server-reported failure with its real status code.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Http,
            message: message.into(),
            status,
        }
    }

    /// Failure of unknown shape.
    pub fn unknown(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            status,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` for failures that may succeed when retried:
    /// timeouts, network errors and 5xx responses.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self.kind {
            ErrorKind::Timeout | ErrorKind::Network => true,
            ErrorKind::Http => self.status >= 500,
            ErrorKind::Unknown => false,
        }
    }
}

/// The uniform result of a transport call.
///
/// Exactly one variant is populated; a success always carries the HTTP
/// status it was received with.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: T, status: u16 },
    Failure(ApiError),
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } => *status,
            Self::Failure(error) => error.status,
        }
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(error) => Some(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts the envelope into a `Result`, dropping the success status.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Success { data, status } => ApiResponse::Success {
                data: f(data),
                status,
            },
            Self::Failure(error) => ApiResponse::Failure(error),
        }
    }
}

/// A scalar query-string value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

macro_rules! param_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

param_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// An immutable description of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    params: Vec<(String, ParamValue)>,
    body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            path: endpoint.path(),
            params: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(endpoint: Endpoint) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn post(endpoint: Endpoint) -> Self {
        Self::new(Method::POST, endpoint)
    }

    #[must_use]
    pub fn put(endpoint: Endpoint) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    #[must_use]
    pub fn delete(endpoint: Endpoint) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    /// Adds a query parameter when present. `None` is dropped, never sent
    /// as an empty string or `null`.
    #[must_use]
    pub fn param_opt(self, name: &str, value: Option<impl Into<ParamValue>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Attaches a JSON body. Bodies that fail to serialize, or serialize to
    /// `null`, are left off.
    #[must_use]
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(serde_json::Value::Null) => self.body = None,
            Ok(value) => self.body = Some(value),
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "dropping unserializable request body");
                self.body = None;
            }
        }
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Renders the query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.url("http://localhost")
            .ok()
            .and_then(|url| url.query().map(ToString::to_string))
            .unwrap_or_default()
    }

    /// Resolves the full request URL against `base_url`.
    pub fn url(&self, base_url: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&joined)
            .map_err(|e| ApiError::network(format!("Invalid URL {joined}: {e}")))?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.params
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.to_string())),
            );
        }
        Ok(url)
    }
}

/// HTTP client for the monitoring API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Creates a client from the given configuration.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Performs a request and decodes the JSON response into `T`.
    pub async fn request<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> ApiResponse<T> {
        tracing::debug!(method = %descriptor.method, path = %descriptor.path, "api request");

        let response = match tokio::time::timeout(self.config.timeout, self.execute(descriptor)).await {
            Ok(response) => response,
            // Dropping the `execute` future aborts the underlying request.
            Err(_) => ApiResponse::Failure(ApiError::timeout()),
        };

        if let ApiResponse::Failure(error) = &response {
            tracing::warn!(
                method = %descriptor.method,
                path = %descriptor.path,
                status = error.status,
                error = %error.message,
                "api request failed"
            );
        }
        response
    }

    pub async fn get<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> ApiResponse<T> {
        self.request(&descriptor).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &(impl Serialize + ?Sized),
    ) -> ApiResponse<T> {
        self.request(&RequestDescriptor::post(endpoint).json(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &(impl Serialize + ?Sized),
    ) -> ApiResponse<T> {
        self.request(&RequestDescriptor::put(endpoint).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResponse<T> {
        self.request(&RequestDescriptor::delete(endpoint)).await
    }

    async fn execute<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> ApiResponse<T> {
        let url = match descriptor.url(&self.config.base_url) {
            Ok(url) => url,
            Err(error) => return ApiResponse::Failure(error),
        };

        let mut builder = self
            .http
            .request(descriptor.method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if descriptor.method != Method::GET && descriptor.method != Method::DELETE {
            if let Some(body) = &descriptor.body {
                // `json` also sets `Content-Type: application/json`.
                builder = builder.json(body);
            }
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return ApiResponse::Failure(classify(&e)),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ApiResponse::Failure(classify(&e)),
        };

        if !status.is_success() {
            return ApiResponse::Failure(ApiError::http(status.as_u16(), error_message(status, &bytes)));
        }

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        match serde_json::from_slice(body) {
            Ok(data) => ApiResponse::Success {
                data,
                status: status.as_u16(),
            },
            Err(e) => ApiResponse::Failure(ApiError::unknown(
                status.as_u16(),
                format!("Invalid response body: {e}"),
            )),
        }
    }
}

fn classify(error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout()
    } else {
        ApiError::network(error.to_string())
    }
}

/// Extracts the `message` field of an error body, falling back to a generic
/// description of the status.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|message| !message.is_empty())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| format!("HTTP Error: {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_params_are_dropped() {
        let request = RequestDescriptor::get(Endpoint::Articles)
            .param("days", 7_u32)
            .param_opt("media_id", None::<u32>);
        assert_eq!(request.query_string(), "days=7");
    }

    #[test]
    fn test_params_keep_insertion_order() {
        let request = RequestDescriptor::get(Endpoint::Articles)
            .param("media_id", 3_u32)
            .param("days", 7_u32)
            .param("limit", 100_u32);
        assert_eq!(request.query_string(), "media_id=3&days=7&limit=100");
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let request = RequestDescriptor::get(Endpoint::AudienceGlobal).param("days", 30_u32);
        let url = request
            .url("http://localhost:8000/")
            .expect("url should resolve");
        assert_eq!(url.as_str(), "http://localhost:8000/api/audience/global/?days=30");
    }

    #[test]
    fn test_url_without_params_has_no_query() {
        let url = RequestDescriptor::get(Endpoint::Medias)
            .url("http://localhost:8000")
            .expect("url should resolve");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_string_params_are_encoded() {
        let request = RequestDescriptor::get(Endpoint::Classifications).param("categorie", "Économie");
        assert_eq!(request.query_string(), "categorie=%C3%89conomie");
    }

    #[test]
    fn test_null_body_is_dropped() {
        let request = RequestDescriptor::post(Endpoint::ScrapingTrigger).json(&None::<u32>);
        assert!(request.body().is_none());

        let request = RequestDescriptor::post(Endpoint::ScrapingTrigger)
            .json(&serde_json::json!({"all": true, "days": 7}));
        assert_eq!(
            request.body(),
            Some(&serde_json::json!({"all": true, "days": 7}))
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, br#"{"message":"queue full"}"#),
            "queue full"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, b"<html>not found</html>"),
            "HTTP Error: 404"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, br#"{"error":"nope"}"#),
            "HTTP Error: 400"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::timeout().is_transient());
        assert!(ApiError::network("refused").is_transient());
        assert!(ApiError::http(503, "down").is_transient());
        assert!(!ApiError::http(404, "missing").is_transient());
        assert!(!ApiError::unknown(200, "bad json").is_transient());
    }

    #[test]
    fn test_envelope_accessors() {
        let ok: ApiResponse<i32> = ApiResponse::Success { data: 1, status: 200 };
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&1));
        assert_eq!(ok.status(), 200);

        let failed: ApiResponse<i32> = ApiResponse::Failure(ApiError::timeout());
        assert!(!failed.is_success());
        assert_eq!(failed.status(), 408);
        assert_eq!(failed.error().map(ApiError::message), Some("Request timeout"));
        assert!(failed.into_result().is_err());
    }
}
