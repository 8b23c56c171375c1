//! Change notifications for gig mutations.
//!
//! This crate provides:
//! - The `Publisher` capability (`publish(topic, payload)`)
//! - An in-process broadcast hub feeding WebSocket subscribers
//! - Redis Pub/Sub publishing for other processes
//! - Fan-out over several transports and a recording publisher for tests
//! - `ChangeNotifier`, the fire-and-forget handle used by the gig service

pub mod broadcast;
pub mod error;
pub mod fanout;
pub mod metrics;
pub mod notifier;
pub mod publisher;
pub mod recording;
pub mod redis_pubsub;

pub use broadcast::BroadcastPublisher;
pub use error::{EventError, EventResult};
pub use fanout::FanoutPublisher;
pub use notifier::ChangeNotifier;
pub use publisher::{Publisher, TopicMessage};
pub use recording::RecordingPublisher;
pub use redis_pubsub::RedisPublisher;
