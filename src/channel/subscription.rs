use std::sync::Arc;

use tracing::debug;

use super::{ChannelError, Shared};
use crate::domain::OutputRecord;

/// The viewer's handle on an [`OutputChannel`](super::OutputChannel).
///
/// Only the most recently attached subscription receives records. Dropping
/// it detaches the viewer; queued and later records wait for the next one.
pub struct Subscription {
    shared: Arc<Shared>,
    generation: u64,
}

impl Subscription {
    pub(super) fn new(shared: Arc<Shared>, generation: u64) -> Self {
        Self { shared, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer subscriber has replaced this one
    pub fn is_superseded(&self) -> bool {
        self.shared.lock().generation != self.generation
    }

    /// Take the next queued record, if any.
    pub fn try_next(&self) -> Result<Option<OutputRecord>, ChannelError> {
        let mut state = self.shared.lock();
        if state.generation != self.generation {
            return Err(ChannelError::Superseded(self.generation));
        }

        let record = state.queue.pop_front();
        if record.is_some() {
            state.stats.delivered += 1;
        }
        if state.queue.is_empty() {
            state.wake_pending = false;
        }
        Ok(record)
    }

    /// Take every queued record in post order.
    pub fn drain(&self) -> Result<Vec<OutputRecord>, ChannelError> {
        let mut state = self.shared.lock();
        if state.generation != self.generation {
            return Err(ChannelError::Superseded(self.generation));
        }

        let records: Vec<OutputRecord> = state.queue.drain(..).collect();
        state.stats.delivered += records.len() as u64;
        state.wake_pending = false;
        Ok(records)
    }

    /// Number of records waiting for this subscriber
    pub fn pending(&self) -> usize {
        let state = self.shared.lock();
        if state.generation != self.generation {
            return 0;
        }
        state.queue.len()
    }

    /// Wait for the next record.
    ///
    /// Returns `None` once this subscription has been superseded.
    pub async fn next(&self) -> Option<OutputRecord> {
        loop {
            // Register before checking so a post between the check and the
            // await is not missed
            let notified = self.shared.notify.notified();
            match self.try_next() {
                Ok(Some(record)) => return Some(record),
                Ok(None) => {}
                Err(_) => return None,
            }
            notified.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if state.generation == self.generation {
            state.attached = false;
            state.waker = None;
            state.wake_pending = false;
            debug!(
                generation = self.generation,
                pending = state.queue.len(),
                "output subscriber detached"
            );
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("generation", &self.generation)
            .finish()
    }
}
