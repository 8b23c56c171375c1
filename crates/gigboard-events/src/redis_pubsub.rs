//! Redis Pub/Sub publisher.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::EventResult;
use crate::publisher::{Publisher, TopicMessage};

/// Publishes each event to the Redis channel `<prefix><topic>`.
pub struct RedisPublisher {
    client: redis::Client,
    prefix: String,
}

impl RedisPublisher {
    pub fn new(redis_url: &str, prefix: impl Into<String>) -> EventResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            prefix: prefix.into(),
        })
    }

    /// Get the channel name for a topic.
    pub fn channel_name(&self, topic: &str) -> String {
        format!("{}{}", self.prefix, topic)
    }
}

#[async_trait]
impl Publisher for RedisPublisher {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> EventResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let channel = self.channel_name(topic);
        let message = serde_json::to_string(&TopicMessage::new(topic, payload.clone()))?;

        debug!("Publishing gig event to {}", channel);
        conn.publish::<_, _, ()>(channel, message).await?;

        Ok(())
    }
}
