//! Stream-based subscriptions.
//!
//! A [`SubscriptionSource`] describes an ongoing event source (a cached
//! query, a timer, the host's focus signal, ...) as a stream. A
//! [`Subscription`] wraps a source and maps its output into the host's
//! message type. The [`SubscriptionManager`] runs subscriptions, keyed by
//! their [`SubscriptionId`], forwarding every item into a channel.
//!
//! Dropping a subscription drops its stream. For query subscriptions that is
//! how a view "unmounts": the cache sees one subscriber fewer.
//!
//! # Example
//!
//! ```rust
//! use mediawatch::subscription::{Subscription, time::Timer};
//!
//! enum Message {
//!     Tick,
//! }
//!
//! let sub = Subscription::new(Timer::new(1000)).map(|_| Message::Tick);
//! ```

pub mod focus;
pub mod http;
pub mod time;

use std::any::TypeId;
use std::collections::HashMap;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identity of a subscription: the source type plus a hash of its
/// parameters. Two subscriptions with the same id are the same subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    hash: u64,
}

impl SubscriptionId {
    /// Builds an id for source type `T` with the given parameter hash.
    #[must_use]
    pub fn of<T: 'static>(hash: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            hash,
        }
    }
}

/// A source of values delivered as a stream.
pub trait SubscriptionSource: Send + 'static {
    type Output;

    /// Creates a fresh stream. Each call starts an independent subscription.
    fn stream(&self) -> BoxStream<'static, Self::Output>;

    fn id(&self) -> SubscriptionId;
}

/// A subscription producing messages of type `Msg`.
pub struct Subscription<Msg> {
    pub(crate) id: SubscriptionId,
    pub(crate) spawn: Box<dyn Fn() -> BoxStream<'static, Msg> + Send>,
}

impl<Msg: 'static> Subscription<Msg> {
    /// Wraps a source whose output is already the message type.
    pub fn new<S>(source: S) -> Self
    where
        S: SubscriptionSource<Output = Msg>,
    {
        let id = source.id();
        Self {
            id,
            spawn: Box::new(move || source.stream()),
        }
    }

    /// Transforms every produced message.
    #[must_use]
    pub fn map<F, T>(self, f: F) -> Subscription<T>
    where
        F: Fn(Msg) -> T + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let spawn = self.spawn;
        Subscription {
            id: self.id,
            spawn: Box::new(move || {
                let f = f.clone();
                spawn().map(f).boxed()
            }),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Starts a new stream for this subscription.
    #[must_use]
    pub fn stream(&self) -> BoxStream<'static, Msg> {
        (self.spawn)()
    }
}

/// Handle for a running subscription task
pub struct Handle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Handle {
    pub const fn new(token: CancellationToken, join: JoinHandle<()>) -> Self {
        Self { token, join }
    }

    /// Signals the task to stop without waiting for it.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Cancel the subscription and wait for task completion
    pub async fn cancel(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}

/// Runs a changing set of subscriptions.
///
/// [`update`](Self::update) takes the complete list of subscriptions that
/// should be active: new ids are started, missing ids are stopped, and
/// subscriptions already running are left untouched.
pub struct SubscriptionManager<Msg> {
    tx: mpsc::UnboundedSender<Msg>,
    running: HashMap<SubscriptionId, Handle>,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self {
            tx,
            running: HashMap::new(),
        }
    }

    /// Reconciles the running set with `subscriptions`.
    pub fn update(&mut self, subscriptions: impl IntoIterator<Item = Subscription<Msg>>) {
        let mut wanted: HashMap<SubscriptionId, Subscription<Msg>> = subscriptions
            .into_iter()
            .map(|sub| (sub.id, sub))
            .collect();

        self.running.retain(|id, handle| {
            if wanted.remove(id).is_some() {
                true
            } else {
                handle.stop();
                false
            }
        });

        for (id, sub) in wanted {
            let handle = self.start(&sub);
            self.running.insert(id, handle);
        }
    }

    /// Number of subscriptions currently running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Stops every subscription and waits for their tasks to finish.
    pub async fn shutdown(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.cancel().await;
        }
    }

    fn start(&self, sub: &Subscription<Msg>) -> Handle {
        let token = CancellationToken::new();
        let mut stream = sub.stream();
        let tx = self.tx.clone();
        let child = token.clone();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    item = stream.next() => match item {
                        Some(msg) => {
                            if tx.send(msg).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        Handle::new(token, join)
    }
}
