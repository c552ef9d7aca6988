//! Prelude module for convenient imports.
//!
//! ```
//! use mediawatch::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`ApiClient`], [`ApiConfig`], [`ApiResponse`], [`ApiError`] - Backend access
//! - [`QueryClient`], [`Query`], [`Mutation`] - The query cache
//! - [`Subscription`], [`SubscriptionSource`] - For handling event sources
//! - [`Catalog`] - The dashboard's queries and mutations
//! - The request parameter types used by the catalog

pub use crate::api::types::{ArticleParams, HistoryParams, ScrapeOptions, ScrapingRequest};
pub use crate::api::{ApiClient, ApiConfig, ApiError, ApiResponse};
pub use crate::queries::{Catalog, ScrapeMedia};
pub use crate::subscription::focus::Focus;
pub use crate::subscription::http::{
    Mutation, Notification, Query, QueryClient, QueryConfig, QueryError, QueryKey, QueryResult, QueryState,
    RetryPolicy,
};
pub use crate::subscription::{Subscription, SubscriptionManager, SubscriptionSource};
