//! Rendered-output cache with its own reset channel.
//!
//! Stores rendered template output by key. Unlike the index-derived
//! caches, resets arrive on the cache's own broker: whoever reloads the
//! template source publishes [`Signal::Reset`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::broker::Broker;
use crate::index::Signal;

pub struct TemplateCache {
    rendered: RwLock<HashMap<String, String>>,
    broker: Broker<Signal>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self {
            rendered: RwLock::new(HashMap::new()),
            broker: Broker::new(16),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.rendered.read().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, output: impl Into<String>) {
        self.rendered.write().insert(key.into(), output.into());
    }

    pub fn clear(&self) {
        self.rendered.write().clear();
    }

    /// The broker to publish [`Signal::Reset`] on.
    pub fn broker(&self) -> &Broker<Signal> {
        &self.broker
    }

    /// Clear the cache whenever a reset is published.
    pub fn spawn_reset_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let mut rx = self.broker.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Signal::Reset) => {
                        crate::debug_event!("templates", "reset");
                        cache.clear();
                    }
                    Ok(other) => {
                        tracing::error!("[templates] unexpected signal: {other:?}");
                    }
                    Err(RecvError::Lagged(_)) => cache.clear(),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}
