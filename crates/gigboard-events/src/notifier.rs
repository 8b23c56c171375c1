//! Fire-and-forget change notifications.

use std::sync::Arc;

use tracing::{debug, info_span, warn, Instrument};

use gigboard_models::ChangeEvent;

use crate::metrics::{record_failed, record_published, record_skipped};
use crate::publisher::Publisher;

/// Handle the gig service uses to announce mutations.
///
/// Publishing runs on a spawned task. Failures are logged and counted and never
/// reach the caller.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    publisher: Option<Arc<dyn Publisher>>,
}

impl ChangeNotifier {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher: Some(publisher),
        }
    }

    /// Notifier without a transport; every event is skipped.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.publisher.is_some()
    }

    /// Publish `event` on its topic in the background.
    pub fn notify(&self, event: ChangeEvent) {
        let topic = event.topic();

        let Some(publisher) = self.publisher.clone() else {
            warn!(topic, "No event transport configured, skipping notification");
            record_skipped(topic);
            return;
        };

        let payload = match event.payload_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic, "Failed to serialize event payload: {}", e);
                record_failed(topic);
                return;
            }
        };

        let span = info_span!("publish_event", topic, transport = publisher.name());
        tokio::spawn(
            async move {
                match publisher.publish(topic, &payload).await {
                    Ok(()) => {
                        debug!("Published gig event");
                        record_published(topic);
                    }
                    Err(e) => {
                        warn!("Failed to publish gig event: {}", e);
                        record_failed(topic);
                    }
                }
            }
            .instrument(span),
        );
    }
}
