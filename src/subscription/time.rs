//! Timer subscription for periodic events.
//!
//! [`Timer`] is what drives query polling: the cache creates a fresh timer
//! every time polling resumes, so the first tick always lands one full
//! interval after the resume point.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::time::MissedTickBehavior;
use tokio::time::interval;
use tokio_stream::wrappers::IntervalStream;

use super::{SubscriptionId, SubscriptionSource};

/// Messages produced by the [`Timer`] subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A timer tick has occurred.
    Tick,
}

/// A timer subscription that emits tick messages at regular intervals.
///
/// ## Implementation Details
///
/// Uses `tokio::time::interval` with `MissedTickBehavior::Skip`: ticks that
/// were missed (e.g. while the runtime was busy) are dropped instead of being
/// delivered in a burst, and the immediate first tick of the interval is
/// skipped.
///
/// # Example
///
/// ```rust
/// use mediawatch::subscription::{Subscription, time::Timer};
///
/// enum AppMessage {
///     Refresh,
/// }
///
/// let sub = Subscription::new(Timer::new(5000)).map(|_| AppMessage::Refresh);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    period: Duration,
}

impl Timer {
    /// Create a new timer ticking every `interval_ms` milliseconds.
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self::every(Duration::from_millis(interval_ms))
    }

    /// Create a new timer ticking every `period`. A zero period is raised to
    /// one millisecond.
    #[must_use]
    pub const fn every(period: Duration) -> Self {
        let period = if period.is_zero() {
            Duration::from_millis(1)
        } else {
            period
        };
        Self { period }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl SubscriptionSource for Timer {
    type Output = Message;

    fn stream(&self) -> BoxStream<'static, Message> {
        let mut interval = interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        IntervalStream::new(interval)
            .skip(1) // Skip the first immediate tick
            .map(|_| Message::Tick)
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

impl Hash for Timer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.period.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, timeout};

    #[test]
    fn test_timer_new() {
        assert_eq!(Timer::new(1000).period(), Duration::from_secs(1));
        assert_eq!(Timer::every(Duration::ZERO).period(), Duration::from_millis(1));
    }

    #[test]
    fn test_timer_id() {
        assert_eq!(Timer::new(1000).id(), Timer::every(Duration::from_secs(1)).id());
        assert_ne!(Timer::new(1000).id(), Timer::new(2000).id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_no_immediate_tick() {
        let start = Instant::now();
        let mut stream = Timer::new(100).stream();

        let result = timeout(Duration::from_millis(70), stream.next()).await;
        assert!(result.is_err(), "Timer should not tick immediately");

        let result = timeout(Duration::from_millis(200), stream.next()).await;
        assert_eq!(result.ok().flatten(), Some(Message::Tick));
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(105),
            "Timer ticked at {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_on_period() {
        let start = Instant::now();
        let mut stream = Timer::new(50).stream();

        for n in 1..=3 {
            let result = timeout(Duration::from_millis(300), stream.next()).await;
            assert_eq!(result.ok().flatten(), Some(Message::Tick));
            let elapsed = start.elapsed();
            assert!(
                elapsed >= Duration::from_millis(50 * n) && elapsed < Duration::from_millis(50 * n + 5),
                "Tick {n} arrived at {elapsed:?}"
            );
        }
    }
}
