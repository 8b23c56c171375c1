//! Gig listing models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned identifier of a gig.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct GigId(pub String);

impl GigId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GigId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GigId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Gig lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GigStatus {
    /// Listed and accepting takers
    #[default]
    Open,
    /// Work has started
    #[serde(alias = "in_progress")]
    InProgress,
    /// Work finished
    Completed,
    /// Withdrawn by the poster
    Cancelled,
}

impl GigStatus {
    pub const ALL: [GigStatus; 4] = [
        GigStatus::Open,
        GigStatus::InProgress,
        GigStatus::Completed,
        GigStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GigStatus::Open => "open",
            GigStatus::InProgress => "in-progress",
            GigStatus::Completed => "completed",
            GigStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GigStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(GigStatus::Open),
            "in-progress" | "in_progress" => Ok(GigStatus::InProgress),
            "completed" => Ok(GigStatus::Completed),
            "cancelled" => Ok(GigStatus::Cancelled),
            _ => Err(StatusError::Unknown(s.to_string())),
        }
    }
}

/// A gig as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    /// Store-assigned identifier
    pub id: GigId,
    pub title: String,
    pub description: String,
    /// Offered price, always positive
    pub price: f64,
    pub location: String,
    /// Free-form category (plumbing, tutoring, ...)
    pub gig_type: String,
    #[serde(default)]
    pub status: GigStatus,
    /// User that posted the gig
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gig {
    /// Attach a store-assigned identifier to a persisted record.
    pub fn from_record(id: GigId, record: GigRecord) -> Self {
        Self {
            id,
            title: record.title,
            description: record.description,
            price: record.price,
            location: record.location,
            gig_type: record.gig_type,
            status: record.status,
            posted_by: record.posted_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Persisted gig fields (everything but the identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigRecord {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub gig_type: String,
    #[serde(default)]
    pub status: GigStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields that failed required-value checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", .0.join(", "))]
pub struct InvalidFields(pub Vec<&'static str>);

impl InvalidFields {
    pub fn fields(&self) -> &[&'static str] {
        &self.0
    }
}

/// Create request body. Every field is optional so absence can be reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewGig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gig_type: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GigDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub gig_type: String,
}

impl NewGig {
    /// Validate required fields, naming every one that is missing or empty.
    pub fn validate(self) -> Result<GigDraft, InvalidFields> {
        let mut missing = Vec::new();

        if !has_text(&self.title) {
            missing.push("title");
        }
        if !has_text(&self.description) {
            missing.push("description");
        }
        if !self.price.is_some_and(is_valid_price) {
            missing.push("price");
        }
        if !has_text(&self.location) {
            missing.push("location");
        }
        if !has_text(&self.gig_type) {
            missing.push("gigType");
        }

        match (self.title, self.description, self.price, self.location, self.gig_type) {
            (Some(title), Some(description), Some(price), Some(location), Some(gig_type))
                if missing.is_empty() =>
            {
                Ok(GigDraft {
                    title,
                    description,
                    price,
                    location,
                    gig_type,
                })
            }
            _ => Err(InvalidFields(missing)),
        }
    }
}

impl GigDraft {
    /// Build the record persisted for a new gig.
    pub fn into_record(self, posted_by: Option<String>, now: DateTime<Utc>) -> GigRecord {
        GigRecord {
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            gig_type: self.gig_type,
            status: GigStatus::default(),
            posted_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full or partial replacement of a gig's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gig_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GigStatus>,
}

impl GigUpdate {
    /// Reject supplied values that would leave a required field empty.
    pub fn validate(&self) -> Result<(), InvalidFields> {
        let mut invalid = Vec::new();

        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());

        if blank(&self.title) {
            invalid.push("title");
        }
        if blank(&self.description) {
            invalid.push("description");
        }
        if self.price.is_some_and(|p| !is_valid_price(p)) {
            invalid.push("price");
        }
        if blank(&self.location) {
            invalid.push("location");
        }
        if blank(&self.gig_type) {
            invalid.push("gigType");
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(InvalidFields(invalid))
        }
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Status-only patch body. Any other field in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

/// Errors resolving a status patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Status is required")]
    Missing,

    #[error("Unknown status '{0}'")]
    Unknown(String),
}

impl StatusUpdate {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
        }
    }

    /// Resolve the requested status against the known vocabulary.
    pub fn resolve(&self) -> Result<GigStatus, StatusError> {
        match self.status.as_deref() {
            None => Err(StatusError::Missing),
            Some(s) if s.trim().is_empty() => Err(StatusError::Missing),
            Some(s) => s.parse(),
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_request() -> NewGig {
        NewGig {
            title: Some("Fix sink".to_string()),
            description: Some("Leaky pipe".to_string()),
            price: Some(50.0),
            location: Some("Austin".to_string()),
            gig_type: Some("plumbing".to_string()),
        }
    }

    #[test]
    fn test_new_gig_validates() {
        let draft = sink_request().validate().unwrap();
        assert_eq!(draft.title, "Fix sink");
        assert_eq!(draft.price, 50.0);
    }

    #[test]
    fn test_new_gig_names_missing_fields() {
        let request = NewGig {
            title: Some("Fix sink".to_string()),
            ..Default::default()
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.fields(), &["description", "price", "location", "gigType"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: description, price, location, gigType"
        );
    }

    #[test]
    fn test_new_gig_rejects_blank_and_non_positive() {
        let mut request = sink_request();
        request.title = Some("   ".to_string());
        request.price = Some(0.0);
        let err = request.validate().unwrap_err();
        assert_eq!(err.fields(), &["title", "price"]);
    }

    #[test]
    fn test_draft_defaults_to_open() {
        let now = Utc::now();
        let record = sink_request()
            .validate()
            .unwrap()
            .into_record(Some("user-1".to_string()), now);
        assert_eq!(record.status, GigStatus::Open);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_gig_serializes_camel_case() {
        let now = Utc::now();
        let record = sink_request().validate().unwrap().into_record(None, now);
        let gig = Gig::from_record(GigId::from("g1"), record);
        let json = serde_json::to_value(&gig).unwrap();
        assert_eq!(json["id"], "g1");
        assert_eq!(json["gigType"], "plumbing");
        assert_eq!(json["status"], "open");
        assert!(json.get("postedBy").is_none());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("completed".parse::<GigStatus>().unwrap(), GigStatus::Completed);
        assert_eq!("In_Progress".parse::<GigStatus>().unwrap(), GigStatus::InProgress);
        assert_eq!("in-progress".parse::<GigStatus>().unwrap(), GigStatus::InProgress);
        assert!(matches!(
            "archived".parse::<GigStatus>(),
            Err(StatusError::Unknown(_))
        ));
        for status in GigStatus::ALL {
            assert_eq!(status.as_str().parse::<GigStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_update_resolve() {
        assert_eq!(StatusUpdate::default().resolve(), Err(StatusError::Missing));
        assert_eq!(StatusUpdate::new("").resolve(), Err(StatusError::Missing));
        assert_eq!(
            StatusUpdate::new("completed").resolve(),
            Ok(GigStatus::Completed)
        );
    }

    #[test]
    fn test_status_update_ignores_extra_fields() {
        let update: StatusUpdate =
            serde_json::from_str(r#"{"status":"completed","title":"hijack"}"#).unwrap();
        assert_eq!(update.resolve(), Ok(GigStatus::Completed));
    }

    #[test]
    fn test_gig_update_validation() {
        let update = GigUpdate {
            title: Some(String::new()),
            price: Some(-5.0),
            location: Some("Dallas".to_string()),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err().fields(), &["title", "price"]);
        assert!(GigUpdate::default().validate().is_ok());
        assert!(GigUpdate::default().is_empty());
    }

    #[test]
    fn test_gig_update_serializes_only_supplied_fields() {
        let update = GigUpdate {
            price: Some(75.0),
            gig_type: Some("electrical".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["gigType"], "electrical");
    }
}
