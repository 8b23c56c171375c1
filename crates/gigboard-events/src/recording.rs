//! Publisher that records frames instead of delivering them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{EventError, EventResult};
use crate::publisher::{Publisher, TopicMessage};

/// Captures published frames on a channel, or fails every publish.
#[derive(Clone)]
pub struct RecordingPublisher {
    sink: Option<mpsc::UnboundedSender<TopicMessage>>,
    failure: Option<String>,
}

impl RecordingPublisher {
    /// Publisher plus the receiving end of everything it is asked to publish.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TopicMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sink: Some(tx),
                failure: None,
            },
            rx,
        )
    }

    /// Publisher whose every publish fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sink: None,
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> EventResult<()> {
        if let Some(message) = &self.failure {
            return Err(EventError::publish_failed(message.clone()));
        }
        if let Some(sink) = &self.sink {
            sink.send(TopicMessage::new(topic, payload.clone()))
                .map_err(|_| EventError::publish_failed("recording receiver dropped"))?;
        }
        Ok(())
    }
}
