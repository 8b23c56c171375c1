//! Firestore REST API types and JSON conversions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

use crate::document::Fields;

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|n| n.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }

    /// Fields converted to plain JSON.
    pub fn json_fields(&self) -> Fields {
        self.fields
            .as_ref()
            .map(fields_to_json)
            .unwrap_or_default()
    }
}

/// List documents response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    pub documents: Option<Vec<Document>>,
    pub next_page_token: Option<String>,
}

/// Convert a JSON value to a Firestore value.
pub fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::NullValue(()),
        serde_json::Value::Bool(b) => Value::BooleanValue(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::IntegerValue(i.to_string()),
            None => Value::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::StringValue(s.clone()),
        serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.iter().map(json_to_value).collect()),
        }),
        serde_json::Value::Object(map) => Value::MapValue(MapValue {
            fields: Some(json_to_fields(map)),
        }),
    }
}

/// Convert a Firestore value to JSON. Timestamps, bytes and references become strings.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::NullValue(()) => serde_json::Value::Null,
        Value::BooleanValue(b) => serde_json::Value::Bool(*b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(|i| serde_json::Value::Number(i.into()))
            .unwrap_or_else(|_| serde_json::Value::String(s.clone())),
        Value::DoubleValue(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::TimestampValue(s)
        | Value::StringValue(s)
        | Value::BytesValue(s)
        | Value::ReferenceValue(s) => serde_json::Value::String(s.clone()),
        Value::GeoPointValue(p) => serde_json::json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
        }),
        Value::ArrayValue(a) => serde_json::Value::Array(
            a.values
                .as_ref()
                .map(|v| v.iter().map(value_to_json).collect())
                .unwrap_or_default(),
        ),
        Value::MapValue(m) => serde_json::Value::Object(
            m.fields.as_ref().map(fields_to_json).unwrap_or_default(),
        ),
    }
}

pub fn json_to_fields(map: &Map<String, serde_json::Value>) -> HashMap<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), json_to_value(v)))
        .collect()
}

pub fn fields_to_json(fields: &HashMap<String, Value>) -> Fields {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_their_kind() {
        assert_eq!(json_to_value(&json!(50)), Value::IntegerValue("50".to_string()));
        assert_eq!(json_to_value(&json!(49.5)), Value::DoubleValue(49.5));
        assert_eq!(value_to_json(&Value::IntegerValue("7".to_string())), json!(7));
        assert_eq!(value_to_json(&Value::DoubleValue(2.25)), json!(2.25));
    }

    #[test]
    fn test_nested_structures_convert() {
        let original = json!({
            "title": "Fix sink",
            "tags": ["urgent", true, null],
            "meta": {"floor": 2}
        });
        let fields = json_to_fields(original.as_object().unwrap());
        assert!(matches!(fields["tags"], Value::ArrayValue(_)));
        assert!(matches!(fields["meta"], Value::MapValue(_)));
        assert_eq!(serde_json::Value::Object(fields_to_json(&fields)), original);
    }

    #[test]
    fn test_timestamp_becomes_string() {
        let ts = Value::TimestampValue("2024-01-01T00:00:00Z".to_string());
        assert_eq!(value_to_json(&ts), json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_value_wire_format() {
        let wire = serde_json::to_value(Value::StringValue("x".to_string())).unwrap();
        assert_eq!(wire, json!({"stringValue": "x"}));
        let parsed: Value = serde_json::from_value(json!({"integerValue": "12"})).unwrap();
        assert_eq!(parsed, Value::IntegerValue("12".to_string()));
    }

    #[test]
    fn test_document_id_from_name() {
        let mut doc = Document::new(HashMap::new());
        assert_eq!(doc.id(), None);
        doc.name = Some("projects/p/databases/(default)/documents/gigs/abc123".to_string());
        assert_eq!(doc.id(), Some("abc123"));
    }
}
