//! REST access to the monitoring backend.
//!
//! Three layers, leaves first:
//!
//! - [`transport`]: [`ApiClient`] issues requests with a timeout and turns
//!   every outcome into an [`ApiResponse`]
//! - [`endpoints`]: [`Endpoint`] maps logical operations to paths
//! - [`services`]: typed façades such as
//!   [`AudienceService`](services::AudienceService), reached through
//!   accessors on [`ApiClient`]
//!
//! # Example
//!
//! ```rust,no_run
//! use mediawatch::api::{ApiClient, ApiConfig, ApiResponse};
//!
//! # async fn demo() {
//! let api = ApiClient::new(ApiConfig::default());
//! match api.audience().get_global(30).await {
//!     ApiResponse::Success { data, .. } => println!("{} media", data.len()),
//!     ApiResponse::Failure(error) => eprintln!("{} ({})", error, error.status()),
//! }
//! # }
//! ```

pub mod endpoints;
pub mod services;
pub mod transport;
pub mod types;

pub use crate::config::ApiConfig;
pub use endpoints::Endpoint;
pub use transport::{ApiClient, ApiError, ApiResponse, ErrorKind, ParamValue, RequestDescriptor};
