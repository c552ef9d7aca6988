//! Foreground/background signal provided by the host environment.
//!
//! Polling queries only refetch while the host reports
//! [`Focus::Foreground`]. A terminal front end might flip this on
//! focus-change events, a service on an admin command; the cache does not
//! care where the signal comes from.

use std::hash::{DefaultHasher, Hash, Hasher};

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{SubscriptionId, SubscriptionSource};

/// Whether the host application is currently visible to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Focus {
    #[default]
    Foreground,
    Background,
}

impl Focus {
    #[must_use]
    pub const fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground)
    }
}

/// Shared, cloneable focus signal.
///
/// Every clone observes and controls the same value. As a
/// [`SubscriptionSource`] it yields the current focus, then every change.
#[derive(Debug, Clone)]
pub struct FocusSignal {
    tx: watch::Sender<Focus>,
}

impl Default for FocusSignal {
    fn default() -> Self {
        Self::new(Focus::Foreground)
    }
}

impl FocusSignal {
    #[must_use]
    pub fn new(initial: Focus) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// Publishes a new focus value. Setting the current value again is a
    /// no-op for observers.
    pub fn set(&self, focus: Focus) {
        self.tx.send_if_modified(|current| {
            let changed = *current != focus;
            *current = focus;
            changed
        });
    }

    #[must_use]
    pub fn get(&self) -> Focus {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Focus> {
        self.tx.subscribe()
    }
}

impl SubscriptionSource for FocusSignal {
    type Output = Focus;

    fn stream(&self) -> BoxStream<'static, Focus> {
        WatchStream::new(self.tx.subscribe()).boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        "focus".hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_foreground() {
        assert_eq!(FocusSignal::default().get(), Focus::Foreground);
    }

    #[test]
    fn test_clones_share_state() {
        let signal = FocusSignal::default();
        let other = signal.clone();
        other.set(Focus::Background);
        assert_eq!(signal.get(), Focus::Background);
    }

    #[tokio::test]
    async fn test_unchanged_value_does_not_notify() {
        let signal = FocusSignal::default();
        let mut rx = signal.watch();
        rx.mark_unchanged();

        signal.set(Focus::Foreground);
        assert!(!rx.has_changed().unwrap_or(true));

        signal.set(Focus::Background);
        assert!(rx.has_changed().unwrap_or(false));
    }

    #[tokio::test]
    async fn test_stream_yields_current_then_changes() {
        let signal = FocusSignal::default();
        let mut stream = signal.stream();
        assert_eq!(stream.next().await, Some(Focus::Foreground));

        signal.set(Focus::Background);
        assert_eq!(stream.next().await, Some(Focus::Background));
    }
}
