//! Event publishing error types.

use thiserror::Error;

pub type EventResult<T> = Result<T, EventError>;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("{failed} of {total} transports failed: {first}")]
    Partial {
        failed: usize,
        total: usize,
        first: Box<EventError>,
    },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EventError {
    pub fn publish_failed(msg: impl Into<String>) -> Self {
        Self::PublishFailed(msg.into())
    }
}
