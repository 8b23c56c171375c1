//! Typed repositories for gigs and users.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use gigboard_models::{Gig, GigId, GigRecord, GigStatus, GigUpdate, UserProfile};

use crate::document::{DocumentStore, Fields, Filter, StoredDocument};
use crate::error::{StoreError, StoreResult};

pub const GIGS_COLLECTION: &str = "gigs";
pub const USERS_COLLECTION: &str = "users";

/// Repository for gig documents.
#[derive(Clone)]
pub struct GigRepository {
    store: Arc<dyn DocumentStore>,
}

impl GigRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new gig and return it with its assigned id.
    pub async fn insert(&self, record: &GigRecord) -> StoreResult<Gig> {
        let fields = to_fields(record)?;
        let doc = self.store.insert(GIGS_COLLECTION, fields).await?;
        info!(gig_id = %doc.id, "Created gig record");
        document_to_gig(doc)
    }

    /// Every gig, in store order.
    pub async fn list(&self) -> StoreResult<Vec<Gig>> {
        self.find(&Filter::all()).await
    }

    /// Gigs whose title and location contain the given fragments, ignoring case.
    pub async fn search(&self, title: Option<&str>, location: Option<&str>) -> StoreResult<Vec<Gig>> {
        let filter = Filter::all()
            .contains("title", title.unwrap_or_default())
            .contains("location", location.unwrap_or_default());
        self.find(&filter).await
    }

    pub async fn get(&self, id: &GigId) -> StoreResult<Option<Gig>> {
        self.store
            .find_by_id(GIGS_COLLECTION, id.as_str())
            .await?
            .map(document_to_gig)
            .transpose()
    }

    /// Merge supplied fields into a gig and refresh `updatedAt`.
    pub async fn update(
        &self,
        id: &GigId,
        update: &GigUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Gig>> {
        let mut patch = to_fields(update)?;
        patch.insert("updatedAt".to_string(), timestamp(now)?);
        self.patch(id, patch).await
    }

    /// Change only the status of a gig.
    pub async fn set_status(
        &self,
        id: &GigId,
        status: GigStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Gig>> {
        let mut patch = Fields::new();
        patch.insert("status".to_string(), Value::String(status.as_str().to_string()));
        patch.insert("updatedAt".to_string(), timestamp(now)?);
        self.patch(id, patch).await
    }

    /// Remove a gig, returning its last state.
    pub async fn delete(&self, id: &GigId) -> StoreResult<Option<Gig>> {
        let removed = self.store.delete_by_id(GIGS_COLLECTION, id.as_str()).await?;
        if removed.is_some() {
            info!(gig_id = %id, "Deleted gig record");
        }
        removed.map(document_to_gig).transpose()
    }

    async fn patch(&self, id: &GigId, patch: Fields) -> StoreResult<Option<Gig>> {
        self.store
            .update_by_id(GIGS_COLLECTION, id.as_str(), patch)
            .await?
            .map(document_to_gig)
            .transpose()
    }

    async fn find(&self, filter: &Filter) -> StoreResult<Vec<Gig>> {
        let docs = self.store.find_all(GIGS_COLLECTION, filter).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                document_to_gig(doc)
                    .map_err(|e| warn!(gig_id = %id, "Skipping malformed gig document: {}", e))
                    .ok()
            })
            .collect())
    }
}

/// Repository for user documents.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load a user's profile without secret fields.
    pub async fn load_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .store
            .find_by_id(USERS_COLLECTION, user_id)
            .await?
            .map(|doc| UserProfile::from_fields(doc.id, doc.fields)))
    }
}

fn to_fields<T: serde::Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn timestamp(now: DateTime<Utc>) -> StoreResult<Value> {
    Ok(serde_json::to_value(now)?)
}

fn document_to_gig(doc: StoredDocument) -> StoreResult<Gig> {
    let record: GigRecord = serde_json::from_value(Value::Object(doc.fields))
        .map_err(|e| StoreError::serialization(format!("gig {}: {}", doc.id, e)))?;
    Ok(Gig::from_record(GigId::from(doc.id), record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn record(title: &str, location: &str) -> GigRecord {
        let now = Utc::now();
        GigRecord {
            title: title.to_string(),
            description: "desc".to_string(),
            price: 50.0,
            location: location.to_string(),
            gig_type: "plumbing".to_string(),
            status: GigStatus::Open,
            posted_by: Some("user-1".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn repo() -> (MemoryStore, GigRepository) {
        let store = MemoryStore::new();
        let repo = GigRepository::new(Arc::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let (_, repo) = repo();
        let created = repo.insert(&record("Fix sink", "Austin")).await.unwrap();
        assert!(!created.id.as_str().is_empty());
        assert_eq!(created.status, GigStatus::Open);

        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get(&GigId::from("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_matches_both_fields() {
        let (_, repo) = repo();
        repo.insert(&record("Fix sink", "Austin, TX")).await.unwrap();
        repo.insert(&record("Paint fence", "Austin, TX")).await.unwrap();
        repo.insert(&record("Fix roof", "Dallas")).await.unwrap();

        assert_eq!(repo.search(Some("fix"), None).await.unwrap().len(), 2);
        assert_eq!(repo.search(None, Some("AUSTIN")).await.unwrap().len(), 2);
        assert_eq!(repo.search(Some("fix"), Some("austin")).await.unwrap().len(), 1);
        assert_eq!(repo.search(Some(""), Some("")).await.unwrap().len(), 3);
        assert!(repo.search(Some("piano"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_timestamp() {
        let (_, repo) = repo();
        let created = repo.insert(&record("Fix sink", "Austin")).await.unwrap();
        let later = created.updated_at + chrono::Duration::seconds(5);

        let update = GigUpdate {
            price: Some(80.0),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &update, later).await.unwrap().unwrap();
        assert_eq!(updated.price, 80.0);
        assert_eq!(updated.title, "Fix sink");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn test_set_status_touches_only_status() {
        let (_, repo) = repo();
        let created = repo.insert(&record("Fix sink", "Austin")).await.unwrap();

        let updated = repo
            .set_status(&created.id, GigStatus::Completed, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, GigStatus::Completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.price, created.price);

        assert!(repo
            .set_status(&GigId::from("missing"), GigStatus::Completed, Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_gig() {
        let (store, repo) = repo();
        let created = repo.insert(&record("Fix sink", "Austin")).await.unwrap();

        let removed = repo.delete(&created.id).await.unwrap().unwrap();
        assert_eq!(removed.id, created.id);
        assert_eq!(store.count(GIGS_COLLECTION).await, 0);
        assert!(repo.delete(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_skips_malformed_documents() {
        let (store, repo) = repo();
        repo.insert(&record("Fix sink", "Austin")).await.unwrap();
        store
            .put(
                GIGS_COLLECTION,
                "broken",
                json!({"title": "no price"}).as_object().unwrap().clone(),
            )
            .await;

        let gigs = repo.list().await.unwrap();
        assert_eq!(gigs.len(), 1);
        assert_eq!(gigs[0].title, "Fix sink");
    }

    #[tokio::test]
    async fn test_user_profile_hides_password() {
        let store = MemoryStore::new();
        store
            .put(
                USERS_COLLECTION,
                "u1",
                json!({"name": "Dana", "password": "hash"}).as_object().unwrap().clone(),
            )
            .await;
        let users = UserRepository::new(Arc::new(store));

        let profile = users.load_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.get_str("name"), Some("Dana"));
        assert!(profile.get_str("password").is_none());
        assert!(users.load_profile("u2").await.unwrap().is_none());
    }
}
