//! Backend-neutral document store abstraction.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// Top-level fields of a stored document.
pub type Fields = Map<String, Value>;

/// A document together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Case-insensitive substring match on a single text field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Contains {
    field: String,
    needle: String,
}

/// Conjunction of field predicates. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Contains>,
}

impl Filter {
    /// Filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to contain `needle`, ignoring case. Empty needles are dropped.
    pub fn contains(mut self, field: impl Into<String>, needle: &str) -> Self {
        if !needle.is_empty() {
            self.conditions.push(Contains {
                field: field.into(),
                needle: needle.to_lowercase(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.conditions.iter().all(|c| {
            fields
                .get(&c.field)
                .and_then(Value::as_str)
                .is_some_and(|v| v.to_lowercase().contains(&c.needle))
        })
    }
}

/// Abstract CRUD access to collections of JSON documents.
///
/// Every operation is atomic for a single document. Patches merge top-level fields.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs and readiness output.
    fn name(&self) -> &'static str;

    /// Insert a new document; the store assigns the identifier.
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<StoredDocument>;

    /// All documents in `collection` matching `filter`, in store order.
    async fn find_all(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Merge `patch` into an existing document and return the result.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> StoreResult<Option<StoredDocument>>;

    /// Remove a document, returning what was removed.
    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
