//! User profile resolved by the authentication gate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored user fields that never leave the store.
pub const SECRET_FIELDS: &[&str] = &["password"];

/// Store-resident user profile without secret fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl UserProfile {
    /// Build a profile from stored fields, dropping secrets.
    pub fn from_fields(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        for secret in SECRET_FIELDS {
            fields.remove(*secret);
        }
        // The document id is authoritative.
        fields.remove("id");

        Self {
            id: id.into(),
            attributes: fields,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}
