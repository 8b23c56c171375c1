//! Delivery to several transports at once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{EventError, EventResult};
use crate::publisher::Publisher;

/// Publishes to every inner transport; one failing transport does not stop the others.
#[derive(Clone, Default)]
pub struct FanoutPublisher {
    publishers: Vec<Arc<dyn Publisher>>,
}

impl FanoutPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

#[async_trait]
impl Publisher for FanoutPublisher {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> EventResult<()> {
        let mut failures = Vec::new();

        for publisher in &self.publishers {
            if let Err(e) = publisher.publish(topic, payload).await {
                warn!(topic, transport = publisher.name(), "Transport publish failed: {}", e);
                failures.push(e);
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(EventError::Partial {
                failed,
                total: self.publishers.len(),
                first: Box::new(first),
            }),
        }
    }
}
