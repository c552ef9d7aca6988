//! Mutations: writes against the backend that refresh the cache afterwards.
//!
//! A [`Mutation`] bundles the write itself with its side effects, declared up
//! front and inspectable:
//!
//! - the query names it invalidates on success ([`Mutation::invalidates`])
//! - its retry policy (one retry on transient failures unless disabled)
//! - the [`Notification`]s it publishes on success or failure
//!
//! A failed mutation leaves every cache entry untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediawatch::subscription::http::{Mutation, QueryClient, QueryError};
//!
//! # async fn demo() -> Result<(), QueryError> {
//! let client = QueryClient::new();
//! let rename = Mutation::new("rename", |name: String| {
//!     Box::pin(async move { Ok::<_, QueryError>(name.len()) })
//! })
//! .invalidates(["medias"])
//! .notify_error("Rename failed", "Could not rename the media");
//!
//! let length = rename.mutate(&client, "Le Monde".to_string()).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};

use super::query::{QueryClient, QueryError};
use super::retry::RetryPolicy;

/// The state of a mutation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState<T> {
    /// Mutation is idle (not yet started).
    Idle,
    /// Mutation is in progress.
    Loading,
    /// Mutation succeeded with a result.
    Success(T),
    /// Mutation failed with an error.
    Error(QueryError),
}

/// A mutation result containing the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult<T> {
    /// The current state of the mutation.
    pub state: MutationState<T>,
}

impl<T> MutationResult<T> {
    #[must_use]
    pub const fn new(state: MutationState<T>) -> Self {
        Self { state }
    }

    /// Returns the result data if the mutation succeeded, otherwise `None`.
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            MutationState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Returns `true` if the mutation is currently loading.
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, MutationState::Loading)
    }

    /// Returns `true` if the mutation succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.state, MutationState::Success(_))
    }

    /// Returns `true` if the mutation failed.
    pub const fn is_error(&self) -> bool {
        matches!(self.state, MutationState::Error(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A user-facing message, the dashboard's toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

type Mutator<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, QueryError>> + Send + Sync>;
type SuccessNotice<I> = Arc<dyn Fn(&I) -> Notification + Send + Sync>;

#[derive(Debug, Clone)]
struct ErrorNotice {
    title: String,
    fallback: String,
}

/// A mutation for performing data modifications (POST, PUT, DELETE).
///
/// Unlike queries, mutations don't cache their results. A successful run
/// invalidates the declared query names so their subscribers refetch.
pub struct Mutation<I, O> {
    name: String,
    mutator: Mutator<I, O>,
    invalidates: Vec<String>,
    retry: RetryPolicy,
    on_success: Option<SuccessNotice<I>>,
    on_error: Option<ErrorNotice>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            mutator: Arc::clone(&self.mutator),
            invalidates: self.invalidates.clone(),
            retry: self.retry,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<I, O> fmt::Debug for Mutation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("name", &self.name)
            .field("invalidates", &self.invalidates)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<I, O> Mutation<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    /// Mutations retry a transient failure once by default.
    pub const DEFAULT_RETRY: RetryPolicy =
        RetryPolicy::new(1, Duration::from_secs(1), Duration::from_secs(30));

    /// Creates a mutation named `name` (used in logs) running `mutator`.
    pub fn new<F>(name: impl Into<String>, mutator: F) -> Self
    where
        F: Fn(I) -> BoxFuture<'static, Result<O, QueryError>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            mutator: Arc::new(mutator),
            invalidates: Vec::new(),
            retry: Self::DEFAULT_RETRY,
            on_success: None,
            on_error: None,
        }
    }

    /// Adds query names to invalidate after a successful run.
    #[must_use]
    pub fn invalidates<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.invalidates.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Runs the mutator exactly once, whatever the failure.
    #[must_use]
    pub const fn without_retry(self) -> Self {
        self.retry(RetryPolicy::NONE)
    }

    /// Publishes a fixed success notification.
    #[must_use]
    pub fn notify_success(self, title: impl Into<String>, message: impl Into<String>) -> Self {
        let notification = Notification::success(title, message);
        self.notify_success_with(move |_| notification.clone())
    }

    /// Publishes a success notification derived from the input.
    #[must_use]
    pub fn notify_success_with<F>(mut self, notice: F) -> Self
    where
        F: Fn(&I) -> Notification + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(notice));
        self
    }

    /// Sets the title of the error notification and the message used when
    /// the error has no text. Without it, failures are still published under
    /// the mutation's name.
    #[must_use]
    pub fn notify_error(mut self, title: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.on_error = Some(ErrorNotice {
            title: title.into(),
            fallback: fallback.into(),
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query names invalidated after a successful run.
    #[must_use]
    pub fn invalidated_keys(&self) -> &[String] {
        &self.invalidates
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Runs the mutation and applies its side effects.
    ///
    /// On success every declared query name is invalidated and the success
    /// notification is published. On failure no cache entry is touched and
    /// the error notification is published.
    pub async fn mutate(&self, client: &QueryClient, input: I) -> Result<O, QueryError> {
        tracing::debug!(mutation = %self.name, "mutation started");
        let notice = self.on_success.as_ref().map(|notice| notice(&input));
        let mutator = Arc::clone(&self.mutator);
        let result = self
            .retry
            .run(&self.name, || mutator(input.clone()))
            .await;

        match &result {
            Ok(_) => {
                tracing::info!(mutation = %self.name, invalidates = ?self.invalidates, "mutation succeeded");
                for name in &self.invalidates {
                    client.invalidate(name);
                }
                if let Some(notification) = notice {
                    client.notify(notification);
                }
            }
            Err(error) => {
                tracing::warn!(mutation = %self.name, %error, "mutation failed");
                let (title, fallback) = match &self.on_error {
                    Some(on_error) => (on_error.title.clone(), on_error.fallback.clone()),
                    None => (self.name.clone(), format!("{} failed", self.name)),
                };
                let message = error.to_string();
                let message = if message.trim().is_empty() { fallback } else { message };
                client.notify(Notification::error(title, message));
            }
        }

        result
    }

    /// Runs the mutation, reporting its progress as a stream:
    /// `Loading`, then `Success` or `Error`.
    pub fn observe(&self, client: QueryClient, input: I) -> BoxStream<'static, MutationResult<O>> {
        let mutation = self.clone();
        stream::once(async { MutationResult::new(MutationState::Loading) })
            .chain(stream::once(async move {
                match mutation.mutate(&client, input).await {
                    Ok(output) => MutationResult::new(MutationState::Success(output)),
                    Err(error) => MutationResult::new(MutationState::Error(error)),
                }
            }))
            .boxed()
    }
}
