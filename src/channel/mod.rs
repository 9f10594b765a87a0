//! Output delivery from the worker thread to the viewer.
//!
//! [`OutputChannel`] is a mutex-guarded queue with exactly one live
//! [`Subscription`] at a time. Posting never blocks on the viewer: records are
//! appended to the queue and stay there until the current subscriber takes
//! them, so a viewer that is momentarily detached (reconfiguration, pause)
//! loses nothing. Attaching a new subscriber supersedes the previous one and
//! hands it the whole backlog.
//!
//! Wakeups are coalesced. The subscriber's wake callback fires once for the
//! first post after the subscriber last drained the queue; further posts
//! before the queue is emptied only grow it.

mod subscription;

pub use subscription::Subscription;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use crate::domain::OutputRecord;

/// Callback used to wake the viewer's scheduling loop when output arrives.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Error returned when taking records through a subscription that has been
/// replaced by a newer one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("subscription {0} was superseded by a newer subscriber")]
    Superseded(u64),
}

/// Counters describing channel traffic, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Records accepted by `post`
    pub posted: u64,
    /// Records handed to a subscriber
    pub delivered: u64,
    /// Wake callbacks actually invoked
    pub wakeups: u64,
    /// Subscribers attached over the channel's lifetime
    pub subscribers: u64,
}

struct ChannelState {
    queue: VecDeque<OutputRecord>,
    /// Generation of the current subscriber; 0 means none has attached yet
    generation: u64,
    /// Whether the current subscriber holds a live handle
    attached: bool,
    waker: Option<Waker>,
    /// Set by the first post of a burst, cleared when the subscriber takes
    wake_pending: bool,
    stats: ChannelStats,
}

pub(crate) struct Shared {
    state: Mutex<ChannelState>,
    notify: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        // A panicking poster must not cost the viewer its backlog
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker-to-viewer output queue. Cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct OutputChannel {
    shared: Arc<Shared>,
}

impl OutputChannel {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ChannelState {
                    queue: VecDeque::new(),
                    generation: 0,
                    attached: false,
                    waker: None,
                    wake_pending: false,
                    stats: ChannelStats::default(),
                }),
                notify: Notify::new(),
            }),
        }
    }

    /// Queue a record for delivery. Never blocks on the subscriber.
    pub fn post(&self, record: OutputRecord) {
        let waker = {
            let mut state = self.shared.lock();
            state.queue.push_back(record);
            state.stats.posted += 1;

            if state.attached && !state.wake_pending {
                state.wake_pending = true;
                let waker = state.waker.clone();
                if waker.is_some() {
                    state.stats.wakeups += 1;
                }
                waker
            } else {
                None
            }
        };

        self.shared.notify.notify_one();
        if let Some(wake) = waker {
            wake();
        }
    }

    /// Attach a new subscriber without a wake callback (async consumers use
    /// [`Subscription::next`]).
    pub fn subscribe(&self) -> Subscription {
        self.attach(None)
    }

    /// Attach a new subscriber that is woken through `waker` when output
    /// arrives. Any previous subscription is superseded.
    ///
    /// If records are already queued the waker fires once immediately so the
    /// backlog is flushed on the viewer's next turn.
    pub fn subscribe_with_waker(&self, waker: Waker) -> Subscription {
        self.attach(Some(waker))
    }

    fn attach(&self, waker: Option<Waker>) -> Subscription {
        let (generation, backlog, wake_now) = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.attached = true;
            state.waker = waker;
            state.stats.subscribers += 1;

            let backlog = state.queue.len();
            let wake_now = if backlog > 0 {
                state.wake_pending = true;
                if state.waker.is_some() {
                    state.stats.wakeups += 1;
                }
                state.waker.clone()
            } else {
                state.wake_pending = false;
                None
            };
            (state.generation, backlog, wake_now)
        };

        debug!(generation, backlog, "output subscriber attached");

        // Wake any superseded subscriber parked in `next()` so it can observe
        // that it has been replaced
        self.shared.notify.notify_waiters();
        if backlog > 0 {
            self.shared.notify.notify_one();
        }
        if let Some(wake) = wake_now {
            wake();
        }

        Subscription::new(self.shared.clone(), generation)
    }

    /// Number of records waiting for a subscriber
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Whether a subscriber currently holds a live handle
    pub fn has_subscriber(&self) -> bool {
        self.shared.lock().attached
    }

    pub fn stats(&self) -> ChannelStats {
        self.shared.lock().stats
    }
}

impl Default for OutputChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("OutputChannel")
            .field("pending", &state.queue.len())
            .field("generation", &state.generation)
            .field("attached", &state.attached)
            .field("stats", &state.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests;
