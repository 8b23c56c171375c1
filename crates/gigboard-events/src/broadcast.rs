//! In-process broadcast hub.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::EventResult;
use crate::publisher::{Publisher, TopicMessage};

/// Frames buffered per subscriber before it starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// Publishes to every live subscriber of this process.
///
/// Slow subscribers lag and lose the oldest frames; publishers never wait.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<TopicMessage>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TopicMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Publisher for BroadcastPublisher {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> EventResult<()> {
        // Sending only fails when nobody is listening.
        match self.sender.send(TopicMessage::new(topic, payload.clone())) {
            Ok(receivers) => trace!(topic, receivers, "Broadcast event"),
            Err(_) => trace!(topic, "No local subscribers"),
        }
        Ok(())
    }
}
