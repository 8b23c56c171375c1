//! Notification metrics.

use metrics::counter;

pub mod names {
    /// Events delivered to the configured transport
    pub const PUBLISHED_TOTAL: &str = "gigboard_events_published_total";

    /// Events whose delivery failed
    pub const FAILED_TOTAL: &str = "gigboard_events_failed_total";

    /// Events dropped because no transport is configured
    pub const SKIPPED_TOTAL: &str = "gigboard_events_skipped_total";
}

pub fn record_published(topic: &str) {
    counter!(names::PUBLISHED_TOTAL, "topic" => topic.to_string()).increment(1);
}

pub fn record_failed(topic: &str) {
    counter!(names::FAILED_TOTAL, "topic" => topic.to_string()).increment(1);
}

pub fn record_skipped(topic: &str) {
    counter!(names::SKIPPED_TOTAL, "topic" => topic.to_string()).increment(1);
}
