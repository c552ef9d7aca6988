use std::time::Duration;

use tokio::time::Instant;

use super::query::{QueryError, QueryResult, QueryState};

/// Bookkeeping for one cache key.
///
/// Fetches are numbered: [`begin_fetch`](Self::begin_fetch) hands out a
/// generation and [`complete`](Self::complete) only accepts the result of the
/// most recently issued one, so a slow response can never overwrite a newer
/// one.
#[derive(Debug)]
pub(crate) struct CacheEntry<T> {
    state: QueryState<T>,
    fetched_at: Option<Instant>,
    accessed_at: Instant,
    subscribers: usize,
    issued: u64,
    in_flight: Option<u64>,
    invalidated: bool,
}

impl<T: Clone> CacheEntry<T> {
    pub fn new() -> Self {
        Self {
            state: QueryState::Idle,
            fetched_at: None,
            accessed_at: Instant::now(),
            subscribers: 0,
            issued: 0,
            in_flight: None,
            invalidated: false,
        }
    }

    pub const fn subscribers(&self) -> usize {
        self.subscribers
    }

    pub fn attach(&mut self) {
        self.subscribers += 1;
        self.accessed_at = Instant::now();
    }

    pub fn detach(&mut self) {
        self.subscribers = self.subscribers.saturating_sub(1);
        self.accessed_at = Instant::now();
    }

    pub const fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the entry holds a result, successful or not.
    pub const fn is_settled(&self) -> bool {
        matches!(self.state, QueryState::Success { .. } | QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Checks if the successful data is older than `stale_time`.
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.fetched_at
            .is_none_or(|at| at.elapsed() >= stale_time)
    }

    /// Whether a new subscriber should trigger a fetch. Never while one is
    /// already in flight.
    pub fn needs_fetch(&self, stale_time: Duration) -> bool {
        if self.is_fetching() {
            return false;
        }
        if self.invalidated {
            return true;
        }
        match self.state {
            QueryState::Idle | QueryState::Loading | QueryState::Error(_) => true,
            QueryState::Success { .. } => self.is_stale(stale_time),
        }
    }

    /// Issues a new fetch generation. A foreground fetch moves to `Loading`;
    /// a background fetch keeps the current value or error visible.
    pub fn begin_fetch(&mut self, background: bool) -> u64 {
        self.issued += 1;
        self.in_flight = Some(self.issued);
        if !background {
            self.state = QueryState::Loading;
        }
        self.issued
    }

    /// Applies a fetch result. Returns `false` if `generation` was superseded
    /// and the result was discarded.
    pub fn complete(&mut self, generation: u64, result: Result<T, QueryError>) -> bool {
        if generation != self.issued {
            return false;
        }
        self.in_flight = None;
        self.invalidated = false;
        self.state = match result {
            Ok(data) => {
                self.fetched_at = Some(Instant::now());
                QueryState::Success { data, is_stale: false }
            }
            Err(error) => {
                self.fetched_at = None;
                QueryState::Error(error)
            }
        };
        true
    }

    /// Drops the current value and supersedes any fetch in flight.
    pub fn invalidate(&mut self) {
        self.issued += 1;
        self.in_flight = None;
        self.invalidated = true;
        self.fetched_at = None;
        self.state = QueryState::Idle;
    }

    /// Checks if this entry should be garbage collected based on cache time.
    pub fn should_gc(&self, cache_time: Duration) -> bool {
        self.subscribers == 0 && !self.is_fetching() && self.accessed_at.elapsed() >= cache_time
    }

    /// Current state as seen by subscribers.
    pub fn snapshot(&self, stale_time: Duration) -> QueryResult<T> {
        let state = match &self.state {
            QueryState::Success { data, .. } => QueryState::Success {
                data: data.clone(),
                is_stale: self.is_stale(stale_time),
            },
            other => other.clone(),
        };
        QueryResult {
            state,
            is_fetching: self.is_fetching(),
        }
    }
}
