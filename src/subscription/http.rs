//! HTTP query and mutation support with caching.
//!
//! This module provides subscription-based queries and declarative mutations,
//! similar to SWR or TanStack Query.
//!
//! # Features
//!
//! - **Queries**: Subscription-based data fetching with de-duplication,
//!   staleness, invalidation and focus-aware polling
//! - **Mutations**: Writes with declared invalidations, retries and notifications
//! - **Cache management**: Per-key generations so that the latest request wins
//!
//! # Example
//!
//! ```rust,ignore
//! use mediawatch::subscription::Subscription;
//! use mediawatch::subscription::http::{Mutation, Query, QueryClient};
//!
//! let client = QueryClient::new();
//!
//! let stats = Subscription::new(Query::new(
//!     "stats",
//!     move || Box::pin(fetch_stats()),
//!     client.clone(),
//! ))
//! .map(Message::Stats);
//!
//! let scrape = Mutation::new("scrape", |url: String| Box::pin(scrape(url)))
//!     .invalidates(["articles", "stats"]);
//! scrape.mutate(&client, url).await?;
//! ```

mod cache;
mod config;
mod key;
pub mod mutation;
pub mod query;
mod retry;

// Re-export main types
pub use config::QueryConfig;
pub use key::QueryKey;
pub use mutation::{Mutation, MutationResult, MutationState, Notification, NotificationLevel};
pub use query::{Query, QueryClient, QueryError, QueryResult, QueryState};
pub use retry::RetryPolicy;
