//! Typed publish/subscribe channel for in-process change signals.
//!
//! Producers (the file watcher, the reconciler) publish small signal values;
//! consumers (rescan loops, cache invalidators) each hold their own receiver
//! and process messages at their own pace. Built on a bounded
//! `tokio::sync::broadcast` channel.
//!
//! # Backpressure policy
//!
//! Publishing never blocks. A subscriber that falls more than `capacity`
//! messages behind loses the oldest ones and observes
//! [`tokio::sync::broadcast::error::RecvError::Lagged`]. That is acceptable
//! here: every signal only means "at least one more of this kind occurred",
//! never a precise log. Subscribers see messages in publish order; there is
//! no ordering guarantee across subscribers and no replay of messages
//! published before `subscribe()`.

use tokio::sync::broadcast;

/// Fan-out channel for change signals of kind `M`.
#[derive(Clone)]
pub struct Broker<M: Clone> {
    sender: broadcast::Sender<M>,
}

impl<M: Clone + std::fmt::Debug> Broker<M> {
    /// Create a broker whose per-subscriber backlog holds up to `capacity`
    /// messages before the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a message to all current subscribers.
    ///
    /// Returns immediately. Publishing with no subscribers drops the
    /// message, which is fine for change signals.
    pub fn publish(&self, msg: M) {
        match self.sender.send(msg) {
            Ok(count) => {
                crate::debug_event!("broker", "published", "{count} subscribers");
            }
            Err(broadcast::error::SendError(msg)) => {
                crate::debug_event!("broker", "dropped", "no subscribers for {msg:?}");
            }
        }
    }

    /// Register a new subscriber.
    ///
    /// The receiver only sees messages published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<M> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<M: Clone + std::fmt::Debug> Default for Broker<M> {
    fn default() -> Self {
        Self::new(16)
    }
}
