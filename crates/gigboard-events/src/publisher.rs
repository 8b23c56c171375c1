//! Publish capability shared by every transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EventResult;

/// Frame delivered to subscribers: `{"event": <topic>, "payload": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub event: String,
    pub payload: serde_json::Value,
}

impl TopicMessage {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: topic.into(),
            payload,
        }
    }
}

/// A transport that delivers a payload to every observer of a topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Transport name for logs and metrics.
    fn name(&self) -> &'static str;

    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> EventResult<()>;
}
