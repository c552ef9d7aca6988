//! # mediawatch - data layer of the media-surveillance dashboard
//!
//! mediawatch talks to the monitoring backend (media registry, articles,
//! classifications, audience, scraping jobs) and keeps the results in a
//! subscription-driven query cache.
//!
//! ## Layers
//!
//! 1. **Transport** ([`api::transport`]): every request resolves to an
//!    [`ApiResponse`](api::ApiResponse), failures included
//! 2. **Endpoints** ([`api::endpoints`]): logical operations mapped to paths
//! 3. **Services** ([`api::services`]): one typed method per backend operation
//! 4. **Cache** ([`subscription::http`]): de-duplicated, invalidatable,
//!    focus-aware polling queries and mutations with declared side effects
//! 5. **Catalog** ([`queries`]): the dashboard's queries and mutations
//!
//! ## Core Components
//!
//! - [`ApiClient`](api::ApiClient): The HTTP client and entry point to the services
//! - [`QueryClient`](subscription::http::QueryClient): The query cache
//! - [`Subscription`](subscription::Subscription): Represents ongoing event sources
//! - [`Catalog`](queries::Catalog): Builds the dashboard's queries and mutations
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use mediawatch::prelude::*;
//!
//! # async fn demo() -> Result<(), mediawatch::config::ConfigError> {
//! let api = ApiClient::new(ApiConfig::from_env()?);
//! let catalog = Catalog::new(api, QueryClient::new());
//!
//! let mut history = catalog.scraping_history(HistoryParams::default()).stream();
//! while let Some(result) = history.next().await {
//!     if let Some(history) = result.data() {
//!         println!("{} tasks", history.total);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod prelude;
pub mod queries;
pub mod subscription;
