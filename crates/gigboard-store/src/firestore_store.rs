//! `DocumentStore` backed by the Firestore REST client.

use async_trait::async_trait;
use tracing::debug;

use crate::client::FirestoreClient;
use crate::document::{DocumentStore, Fields, Filter, StoredDocument};
use crate::error::{StoreError, StoreResult};
use crate::types::{json_to_fields, Document};

/// Collection probed by readiness checks. It does not need to exist.
const HEALTH_COLLECTION: &str = "_health";
const HEALTH_DOCUMENT: &str = "_check";

#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self::new(FirestoreClient::from_env()?))
    }

    fn to_stored(doc: Document) -> StoreResult<StoredDocument> {
        let id = doc
            .id()
            .ok_or_else(|| StoreError::InvalidResponse("document without a name".to_string()))?
            .to_string();
        Ok(StoredDocument::new(id, doc.json_fields()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    // Not retried: a create that timed out after reaching the server would duplicate.
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<StoredDocument> {
        let doc = self
            .client
            .create_document(collection, json_to_fields(&fields))
            .await?;
        let stored = Self::to_stored(doc)?;
        debug!(collection, id = %stored.id, "Created Firestore document");
        Ok(stored)
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        let docs = self.client.list_all_documents(collection).await?;

        let mut matched = Vec::with_capacity(docs.len());
        for doc in docs {
            let stored = Self::to_stored(doc)?;
            if filter.matches(&stored.fields) {
                matched.push(stored);
            }
        }
        Ok(matched)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.client
            .with_retry("get_document", || self.client.get_document(collection, id))
            .await?
            .map(Self::to_stored)
            .transpose()
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> StoreResult<Option<StoredDocument>> {
        let fields = json_to_fields(&patch);
        self.client
            .with_retry("update_document", || {
                self.client
                    .update_existing_document(collection, id, fields.clone())
            })
            .await?
            .map(Self::to_stored)
            .transpose()
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let Some(existing) = self.find_by_id(collection, id).await? else {
            return Ok(None);
        };

        // Not retried: a lost response would turn the retry into a 404.
        let deleted = self.client.delete_existing_document(collection, id).await?;

        Ok(deleted.then_some(existing))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .get_document(HEALTH_COLLECTION, HEALTH_DOCUMENT)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FirestoreConfig;
    use crate::retry::RetryConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{any, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS: &str = "/v1/projects/test-project/databases/(default)/documents";

    fn store_for(server: &MockServer) -> FirestoreStore {
        let config = FirestoreConfig {
            project_id: "test-project".to_string(),
            database_id: "(default)".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig {
                max_retries: 1,
                base_delay_ms: 1,
                max_delay_ms: 5,
            },
            emulator_host: Some(server.address().to_string()),
        };
        FirestoreStore::new(FirestoreClient::new(config).unwrap())
    }

    fn gig_doc(id: &str, title: &str, location: &str) -> serde_json::Value {
        json!({
            "name": format!("projects/test-project/databases/(default)/documents/gigs/{}", id),
            "fields": {
                "title": {"stringValue": title},
                "location": {"stringValue": location},
                "price": {"doubleValue": 50.0}
            }
        })
    }

    #[tokio::test]
    async fn test_find_by_id_returns_plain_json_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(gig_doc("g1", "Fix sink", "Austin")))
            .expect(1)
            .mount(&server)
            .await;

        let doc = store_for(&server).find_by_id("gigs", "g1").await.unwrap().unwrap();
        assert_eq!(doc.id, "g1");
        assert_eq!(doc.fields["title"], "Fix sink");
        assert_eq!(doc.fields["price"], 50.0);
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs/nope", DOCS)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(store_for(&server).find_by_id("gigs", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_walks_pages_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs", DOCS)))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [gig_doc("g2", "Paint fence", "Dallas")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs", DOCS)))
            .and(query_param("pageSize", "300"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [gig_doc("g1", "Fix sink", "Austin")],
                "nextPageToken": "next"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        let all = store.find_all("gigs", &Filter::all()).await.unwrap();
        assert_eq!(
            all.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["g1", "g2"]
        );
    }

    #[tokio::test]
    async fn test_find_all_filters_client_side() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    gig_doc("g1", "Fix sink", "Austin"),
                    gig_doc("g2", "Paint fence", "Dallas")
                ]
            })))
            .mount(&server)
            .await;

        let found = store_for(&server)
            .find_all("gigs", &Filter::all().contains("location", "aus"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "g1");
    }

    #[tokio::test]
    async fn test_update_missing_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/gigs/gone", DOCS)))
            .and(query_param("currentDocument.exists", "true"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut patch = Fields::new();
        patch.insert("status".to_string(), json!("completed"));
        let result = store_for(&server).update_by_id("gigs", "gone", patch).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = store_for(&server).find_by_id("gigs", "g1").await.unwrap_err();
        assert!(matches!(err, StoreError::ServerError(503, _)));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(gig_doc("g1", "Fix sink", "Austin")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let removed = store_for(&server).delete_by_id("gigs", "g1").await.unwrap().unwrap();
        assert_eq!(removed.fields["location"], "Austin");
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(gig_doc("g1", "Fix sink", "Austin")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/gigs/g1", DOCS)))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = store_for(&server).delete_by_id("gigs", "g1").await.unwrap_err();
        assert!(matches!(err, StoreError::ServerError(503, _)));
    }

    #[tokio::test]
    async fn test_ids_escaping_the_collection_never_reach_the_server() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/test-project/databases/(default)/documents/users/u1",
                "fields": {"password": {"stringValue": "hash"}}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_for(&server);
        for id in ["../users/u1", "..", ".", "g1/../../users/u1"] {
            assert!(store.find_by_id("gigs", id).await.unwrap().is_none());
            assert!(store.delete_by_id("gigs", id).await.unwrap().is_none());

            let mut patch = Fields::new();
            patch.insert("title".to_string(), json!("Fix sink"));
            assert!(store.update_by_id("gigs", id, patch).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_encoded_separator_stays_inside_the_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/users/u1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let found = store_for(&server).find_by_id("gigs", "..%2Fusers%2Fu1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_ping_accepts_missing_health_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/_health/_check", DOCS)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(store_for(&server).ping().await.is_ok());
    }
}
