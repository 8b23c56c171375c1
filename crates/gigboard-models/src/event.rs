//! Change events published after gig mutations.
//!
//! Topic names keep compatibility with existing real-time clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gig::{Gig, GigId};

/// Kind of lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Created,
        EventKind::Updated,
        EventKind::StatusChanged,
        EventKind::Deleted,
    ];

    /// Publish topic for this kind.
    pub fn topic(&self) -> &'static str {
        match self {
            EventKind::Created => "newGig",
            EventKind::Updated => "updateGig",
            EventKind::StatusChanged => "updateGigStatus",
            EventKind::Deleted => "deleteGig",
        }
    }

    /// Reverse lookup from a topic name.
    pub fn from_topic(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.topic() == topic)
    }
}

/// Event payload: the full gig, or only the identifier for deletions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Gig(Box<Gig>),
    Deleted(GigId),
}

/// Ephemeral notification describing a gig mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub payload: EventPayload,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            kind,
            payload,
            occurred_at: Utc::now(),
        }
    }

    pub fn created(gig: Gig) -> Self {
        Self::new(EventKind::Created, EventPayload::Gig(Box::new(gig)))
    }

    pub fn updated(gig: Gig) -> Self {
        Self::new(EventKind::Updated, EventPayload::Gig(Box::new(gig)))
    }

    pub fn status_changed(gig: Gig) -> Self {
        Self::new(EventKind::StatusChanged, EventPayload::Gig(Box::new(gig)))
    }

    pub fn deleted(id: GigId) -> Self {
        Self::new(EventKind::Deleted, EventPayload::Deleted(id))
    }

    pub fn topic(&self) -> &'static str {
        self.kind.topic()
    }

    /// Payload as sent on the wire.
    pub fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gig::{GigRecord, GigStatus};

    fn gig() -> Gig {
        let now = Utc::now();
        Gig::from_record(
            GigId::from("g1"),
            GigRecord {
                title: "Fix sink".to_string(),
                description: "Leaky pipe".to_string(),
                price: 50.0,
                location: "Austin".to_string(),
                gig_type: "plumbing".to_string(),
                status: GigStatus::Open,
                posted_by: None,
                created_at: now,
                updated_at: now,
            },
        )
    }

    #[test]
    fn test_topics() {
        assert_eq!(EventKind::Created.topic(), "newGig");
        assert_eq!(EventKind::Updated.topic(), "updateGig");
        assert_eq!(EventKind::StatusChanged.topic(), "updateGigStatus");
        assert_eq!(EventKind::Deleted.topic(), "deleteGig");
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_topic(kind.topic()), Some(kind));
        }
        assert_eq!(EventKind::from_topic("bogus"), None);
    }

    #[test]
    fn test_gig_payload_is_full_gig() {
        let gig = gig();
        let event = ChangeEvent::created(gig.clone());
        assert_eq!(event.topic(), "newGig");
        assert_eq!(event.payload_json().unwrap(), serde_json::to_value(&gig).unwrap());
    }

    #[test]
    fn test_deleted_payload_is_bare_id() {
        let event = ChangeEvent::deleted(GigId::from("g1"));
        assert_eq!(event.payload_json().unwrap(), serde_json::json!("g1"));
    }
}
