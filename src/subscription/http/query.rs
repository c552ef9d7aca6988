//! Cached queries with de-duplication, invalidation and polling.
//!
//! A [`Query`] is a **subscription**: while at least one stream of it is
//! alive, the [`QueryClient`] keeps its cache entry current.
//!
//! 1. The first subscriber to a missing, stale or invalidated entry starts a
//!    fetch and sees `Loading`. Subscribers joining while that fetch is in
//!    flight share it; the result fans out to all of them.
//! 2. Fresh data is served straight from the cache. Stale data is served and
//!    refreshed in the background (`is_fetching` is set meanwhile).
//! 3. [`QueryClient::invalidate`] refetches entries that have subscribers and
//!    marks the others so that their next subscriber refetches.
//! 4. With a refetch interval, one poller per key refreshes the entry while
//!    the host reports [`Focus::Foreground`].
//!
//! Every fetch gets a generation number; only the result of the most
//! recently issued fetch for a key is applied.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use futures::StreamExt;
//! use mediawatch::subscription::SubscriptionSource;
//! use mediawatch::subscription::http::{Query, QueryClient, QueryError};
//!
//! # async fn demo() {
//! let client = QueryClient::new();
//! let query = Query::new(
//!     "health",
//!     || Box::pin(async { Ok::<_, QueryError>("ok".to_string()) }),
//!     client.clone(),
//! )
//! .refetch_interval(Duration::from_secs(5));
//!
//! let mut results = query.stream();
//! while let Some(result) = results.next().await {
//!     if let Some(status) = result.data() {
//!         println!("{status}");
//!     }
//! }
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::subscription::focus::{Focus, FocusSignal};
use crate::subscription::time::Timer;
use crate::subscription::{SubscriptionId, SubscriptionSource};

use super::cache::CacheEntry;
use super::config::QueryConfig;
use super::key::QueryKey;
use super::mutation::Notification;
use super::retry::RetryPolicy;

/// Error type for query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Fetch failed: {0}")]
    FetchError(String),
}

impl QueryError {
    /// Whether retrying could help. Client-side failures never qualify.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Api(error) => error.is_transient(),
            Self::FetchError(_) => false,
        }
    }

    /// HTTP status of the underlying API failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(error) => Some(error.status()),
            Self::FetchError(_) => None,
        }
    }
}

/// The state of a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// Nothing fetched yet, or the entry was invalidated with no one watching.
    Idle,
    /// Query is loading (fetching data).
    Loading,
    /// Query succeeded with data.
    Success {
        /// The data returned by the query.
        data: T,
        /// Whether the data is stale and should be refetched.
        is_stale: bool,
    },
    /// Query failed with an error.
    Error(QueryError),
}

impl<T> QueryState<T> {
    /// Short name of the state, handy for logs.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success { .. } => "success",
            Self::Error(_) => "error",
        }
    }
}

/// A query result containing the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<T> {
    /// The current state of the query.
    pub state: QueryState<T>,
    /// A fetch for this key is in flight. Set during background refetches,
    /// while the previous data stays visible.
    pub is_fetching: bool,
}

impl<T> QueryResult<T> {
    #[must_use]
    pub const fn new(state: QueryState<T>) -> Self {
        Self {
            state,
            is_fetching: false,
        }
    }

    /// Returns the data if the query succeeded, otherwise `None`.
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns the error if the query failed, otherwise `None`.
    pub const fn error(&self) -> Option<&QueryError> {
        match &self.state {
            QueryState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Returns `true` if the query is currently loading.
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    /// Returns `true` if the query succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.state, QueryState::Success { .. })
    }

    /// Returns `true` if the query failed.
    pub const fn is_error(&self) -> bool {
        matches!(self.state, QueryState::Error(_))
    }

    /// Returns `true` if the query data is stale.
    pub const fn is_stale(&self) -> bool {
        matches!(self.state, QueryState::Success { is_stale: true, .. })
    }
}

type Fetcher<V> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, QueryError>> + Send + Sync>;

struct Shared {
    config: QueryConfig,
    focus: FocusSignal,
    notifications: broadcast::Sender<Notification>,
}

/// A client for managing the query cache.
///
/// The `QueryClient` is the central state manager for queries. It handles:
/// - Caching query results, one entry per [`QueryKey`]
/// - Invalidation by operation name or exact key
/// - The foreground signal that gates polling
/// - The notification channel mutations report to
///
/// Clones are cheap and share the same cache.
///
/// # Example
///
/// ```rust
/// use mediawatch::subscription::http::{QueryClient, QueryConfig};
/// use std::time::Duration;
///
/// let config = QueryConfig::new(
///     Duration::from_secs(30),  // stale_time
///     Duration::from_secs(300), // cache_time
/// );
///
/// let client = QueryClient::with_config(config);
/// ```
#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<DashMap<QueryKey, Arc<dyn ErasedSlot>>>,
    shared: Arc<Shared>,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.cache.len())
            .field("config", &self.shared.config)
            .field("focus", &self.shared.focus.get())
            .finish()
    }
}

impl QueryClient {
    /// Creates a new query client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    /// Creates a new query client with the given configuration.
    #[must_use]
    pub fn with_config(config: QueryConfig) -> Self {
        let (notifications, _) = broadcast::channel(64);
        Self {
            cache: Arc::new(DashMap::new()),
            shared: Arc::new(Shared {
                config,
                focus: FocusSignal::default(),
                notifications,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.shared.config
    }

    /// The foreground signal polling follows.
    #[must_use]
    pub fn focus(&self) -> &FocusSignal {
        &self.shared.focus
    }

    /// Reports whether the host is visible. Pollers pause in the background.
    pub fn set_focus(&self, focus: Focus) {
        tracing::debug!(?focus, "focus changed");
        self.shared.focus.set(focus);
    }

    /// Invalidates every entry of the operation `name`, whatever its
    /// parameters. Returns the number of entries touched.
    pub fn invalidate(&self, name: &str) -> usize {
        let slots: Vec<_> = self
            .cache
            .iter()
            .filter(|entry| entry.key().matches(name))
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        tracing::debug!(name, entries = slots.len(), "invalidating queries");
        let count = slots.len();
        for slot in slots {
            slot.invalidate();
        }
        count
    }

    /// Invalidates exactly `key`. Returns `false` if it isn't cached.
    pub fn invalidate_key(&self, key: &QueryKey) -> bool {
        let slot = self.cache.get(key).map(|entry| Arc::clone(entry.value()));
        match slot {
            Some(slot) => {
                tracing::debug!(%key, "invalidating query");
                slot.invalidate();
                true
            }
            None => false,
        }
    }

    /// Returns the cached data for `key`, if it holds a success of type `V`.
    #[must_use]
    pub fn get_query_data<V>(&self, key: &QueryKey) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get_query_state::<V>(key)
            .and_then(|result| result.data().cloned())
    }

    /// Returns the current result for `key`, if it is cached with type `V`.
    #[must_use]
    pub fn get_query_state<V>(&self, key: &QueryKey) -> Option<QueryResult<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let slot = self.cache.get(key).map(|entry| Arc::clone(entry.value()))?;
        let slot = slot.into_any().downcast::<Slot<V>>().ok()?;
        let result = slot.state_tx.borrow().clone();
        Some(result)
    }

    /// Subscribes once and resolves with the first settled outcome.
    ///
    /// Fresh cached data resolves immediately; otherwise this waits for the
    /// fetch the subscription triggers (or joins the one in flight).
    pub async fn fetch_query<V>(&self, query: &Query<V>) -> Result<V, QueryError>
    where
        V: Clone + Send + Sync + 'static,
    {
        let mut results = self.subscribe(query).into_stream();
        while let Some(result) = results.next().await {
            if result.is_fetching {
                continue;
            }
            match result.state {
                QueryState::Success { data, .. } => return Ok(data),
                QueryState::Error(error) => return Err(error),
                QueryState::Idle | QueryState::Loading => {}
            }
        }
        Err(QueryError::FetchError(format!(
            "query {} was dropped before it settled",
            query.key
        )))
    }

    /// Receives every notification published from now on.
    #[must_use]
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.shared.notifications.subscribe()
    }

    /// Publishes a notification. Nobody listening is not an error.
    pub fn notify(&self, notification: Notification) {
        let _ = self.shared.notifications.send(notification);
    }

    /// Removes entries without subscribers that haven't been accessed for
    /// `cache_time`. Returns the number of entries removed.
    ///
    /// Every new subscription runs this sweep, so hosts only need to call it
    /// to reclaim memory while nothing subscribes.
    pub fn collect_garbage(&self) -> usize {
        let cache_time = self.shared.config.cache_time;
        let before = self.cache.len();
        self.cache.retain(|key, slot| {
            let keep = !slot.is_collectable(cache_time);
            if !keep {
                tracing::debug!(%key, "collecting cache entry");
            }
            keep
        });
        before - self.cache.len()
    }

    /// Stops every poller and drops every entry. Existing subscriber streams
    /// stay open on their last value and receive nothing further; a new
    /// subscription starts from an empty entry.
    pub fn clear(&self) {
        for entry in self.cache.iter() {
            entry.value().shutdown();
        }
        self.cache.clear();
        tracing::debug!("query cache cleared");
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn subscribe<V>(&self, query: &Query<V>) -> QuerySubscriber<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.collect_garbage();
        let slot = self.slot::<V>(&query.key);
        let rx = slot.attach(query);
        QuerySubscriber {
            rx,
            guard: SubscriberGuard { slot },
        }
    }

    fn slot<V>(&self, key: &QueryKey) -> Arc<Slot<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let erased = Arc::clone(
            self.cache
                .entry(key.clone())
                .or_insert_with(|| Slot::<V>::create(key.clone(), &self.shared))
                .value(),
        );

        match erased.into_any().downcast::<Slot<V>>() {
            Ok(slot) => slot,
            Err(_) => {
                tracing::warn!(%key, "query key reused with a different data type, replacing entry");
                let slot = Arc::new(Slot::<V>::new(key.clone(), &self.shared));
                if let Some(old) = self.cache.insert(key.clone(), slot.clone()) {
                    old.shutdown();
                }
                slot
            }
        }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a cache slot, so the client can invalidate and collect
/// entries without knowing their data type.
trait ErasedSlot: Send + Sync {
    fn invalidate(self: Arc<Self>);
    fn detach(&self);
    fn shutdown(&self);
    fn is_collectable(&self, cache_time: Duration) -> bool;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

struct SlotInner<V> {
    entry: CacheEntry<V>,
    fetcher: Option<Fetcher<V>>,
    retry: RetryPolicy,
    poller: Option<CancellationToken>,
}

struct Slot<V> {
    key: QueryKey,
    shared: Arc<Shared>,
    inner: Mutex<SlotInner<V>>,
    state_tx: watch::Sender<QueryResult<V>>,
}

impl<V> Slot<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn new(key: QueryKey, shared: &Arc<Shared>) -> Self {
        let entry = CacheEntry::new();
        let state_tx = watch::Sender::new(entry.snapshot(shared.config.stale_time));
        Self {
            key,
            shared: Arc::clone(shared),
            inner: Mutex::new(SlotInner {
                entry,
                fetcher: None,
                retry: shared.config.retry,
                poller: None,
            }),
            state_tx,
        }
    }

    fn create(key: QueryKey, shared: &Arc<Shared>) -> Arc<dyn ErasedSlot> {
        Arc::new(Self::new(key, shared))
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stale_time(&self) -> Duration {
        self.shared.config.stale_time
    }

    fn publish(&self, inner: &SlotInner<V>) {
        self.state_tx
            .send_replace(inner.entry.snapshot(self.stale_time()));
    }

    /// Registers a subscriber and returns its view of the entry.
    fn attach(self: &Arc<Self>, query: &Query<V>) -> watch::Receiver<QueryResult<V>> {
        let mut inner = self.lock();
        inner.fetcher = Some(Arc::clone(&query.fetcher));
        inner.retry = query.retry.unwrap_or(self.shared.config.retry);
        inner.entry.attach();
        tracing::debug!(key = %self.key, subscribers = inner.entry.subscribers(), "query subscribed");

        if inner.poller.is_none() {
            inner.poller = query.refetch_interval.map(|period| self.start_polling(period));
        }

        // Existing subscribers are only woken when the state actually moves.
        // Only an entry with no result yet goes back to `Loading`.
        if inner.entry.needs_fetch(self.stale_time()) {
            let background = inner.entry.is_settled();
            self.issue(&mut inner, background);
            self.publish(&inner);
        }

        self.state_tx.subscribe()
    }

    /// Starts a fetch for the next generation. The task outlives subscribers:
    /// an in-flight fetch always completes and updates the entry.
    fn issue(self: &Arc<Self>, inner: &mut SlotInner<V>, background: bool) {
        let Some(fetcher) = inner.fetcher.clone() else {
            return;
        };
        let generation = inner.entry.begin_fetch(background);
        let retry = inner.retry;
        let slot = Arc::clone(self);
        tracing::debug!(key = %self.key, generation, background, "fetch issued");

        tokio::spawn(async move {
            let label = slot.key.to_string();
            let result = retry.run(&label, || fetcher()).await;
            slot.complete(generation, result);
        });
    }

    fn complete(&self, generation: u64, result: Result<V, QueryError>) {
        let failure = result.as_ref().err().map(ToString::to_string);
        let mut inner = self.lock();
        if inner.entry.complete(generation, result) {
            match failure {
                Some(error) => tracing::warn!(key = %self.key, generation, %error, "fetch failed"),
                None => tracing::debug!(key = %self.key, generation, "fetch succeeded"),
            }
            self.publish(&inner);
        } else {
            tracing::debug!(key = %self.key, generation, "discarding superseded fetch result");
        }
    }

    fn poll(self: &Arc<Self>) {
        let mut inner = self.lock();
        if inner.entry.subscribers() == 0 || inner.entry.is_fetching() {
            return;
        }
        self.issue(&mut inner, true);
        self.publish(&inner);
    }

    /// Spawns the key's poller. It waits for the foreground, then ticks every
    /// `period`; going to the background drops the timer so that resuming
    /// starts a fresh interval.
    fn start_polling(self: &Arc<Self>, period: Duration) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let slot = Arc::downgrade(self);
        let mut focus = self.shared.focus.watch();
        tracing::debug!(key = %self.key, ?period, "polling started");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancelled.cancelled() => return,
                    foreground = until_foreground(&mut focus) => if !foreground {
                        return;
                    },
                }

                let mut ticks = Timer::every(period).stream();
                loop {
                    tokio::select! {
                        () = cancelled.cancelled() => return,
                        changed = focus.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            let now = *focus.borrow_and_update();
                            if !now.is_foreground() {
                                break;
                            }
                        }
                        tick = ticks.next() => {
                            if tick.is_none() || !poll_once(&slot) {
                                return;
                            }
                        }
                    }
                }
            }
        });

        token
    }
}

async fn until_foreground(focus: &mut watch::Receiver<Focus>) -> bool {
    focus.wait_for(|focus| focus.is_foreground()).await.is_ok()
}

fn poll_once<V>(slot: &Weak<Slot<V>>) -> bool
where
    V: Clone + Send + Sync + 'static,
{
    match slot.upgrade() {
        Some(slot) => {
            slot.poll();
            true
        }
        None => false,
    }
}

impl<V> ErasedSlot for Slot<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn invalidate(self: Arc<Self>) {
        let mut inner = self.lock();
        inner.entry.invalidate();
        if inner.entry.subscribers() > 0 {
            self.issue(&mut inner, false);
        }
        self.publish(&inner);
    }

    fn detach(&self) {
        let mut inner = self.lock();
        inner.entry.detach();
        if inner.entry.subscribers() > 0 {
            return;
        }
        if let Some(poller) = inner.poller.take() {
            poller.cancel();
            tracing::debug!(key = %self.key, "polling stopped");
        }
    }

    fn shutdown(&self) {
        if let Some(poller) = self.lock().poller.take() {
            poller.cancel();
        }
    }

    fn is_collectable(&self, cache_time: Duration) -> bool {
        self.lock().entry.should_gc(cache_time)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Decrements the subscriber count when a query stream is dropped.
struct SubscriberGuard {
    slot: Arc<dyn ErasedSlot>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.slot.detach();
    }
}

struct QuerySubscriber<V> {
    rx: watch::Receiver<QueryResult<V>>,
    guard: SubscriberGuard,
}

impl<V> QuerySubscriber<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn into_stream(self) -> BoxStream<'static, QueryResult<V>> {
        let Self { rx, guard } = self;
        WatchStream::new(rx)
            .map(move |result| {
                let _subscribed = &guard;
                result
            })
            .boxed()
    }
}

/// A query subscription that monitors and fetches data with caching.
///
/// `Query` is a subscription that automatically manages data fetching and caching.
/// When subscribed:
///
/// 1. The current entry is emitted immediately
/// 2. If data is missing or stale, a fetch is triggered (or the one in flight is joined)
/// 3. When invalidated, the query automatically refetches
/// 4. With [`refetch_interval`](Self::refetch_interval), it polls while foregrounded
///
/// Dropping the stream unsubscribes.
///
/// # Example
///
/// ```rust,ignore
/// use mediawatch::subscription::{Subscription, http::{Query, QueryClient}};
///
/// let client = QueryClient::new();
///
/// let query = Subscription::new(Query::new(
///     "stats",
///     move || Box::pin(fetch_stats()),
///     client.clone(),
/// ))
/// .map(Message::Stats);
/// ```
pub struct Query<V> {
    key: QueryKey,
    fetcher: Fetcher<V>,
    client: QueryClient,
    refetch_interval: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl<V> Clone for Query<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetcher: Arc::clone(&self.fetcher),
            client: self.client.clone(),
            refetch_interval: self.refetch_interval,
            retry: self.retry,
        }
    }
}

impl<V> Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new query with the given key, fetcher, and client.
    ///
    /// # Arguments
    ///
    /// * `key` - Identifies the cache entry; a plain name or a [`QueryKey`] with params
    /// * `fetcher` - An async function that fetches the data
    /// * `client` - The query client for cache management
    pub fn new<F>(key: impl Into<QueryKey>, fetcher: F, client: QueryClient) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<V, QueryError>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            fetcher: Arc::new(fetcher),
            client,
            refetch_interval: None,
            retry: None,
        }
    }

    /// Polls every `interval` while subscribed and foregrounded. When several
    /// subscribers of a key ask for different intervals, the first one wins.
    #[must_use]
    pub const fn refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }

    /// Overrides the client's retry policy for this query.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Fetches through the cache once. See [`QueryClient::fetch_query`].
    pub async fn fetch(&self) -> Result<V, QueryError> {
        self.client.fetch_query(self).await
    }
}

impl<V> SubscriptionSource for Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = QueryResult<V>;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        let query = self.clone();
        stream::once(async move { query.client.subscribe(&query) })
            .flat_map(QuerySubscriber::into_stream)
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

impl<V> Hash for Query<V> {
    fn hash<H>(&self, hasher: &mut H)
    where
        H: std::hash::Hasher,
    {
        self.key.hash(hasher);
    }
}
