//! Firestore REST API client.
//!
//! - Token caching with refresh margin (or a fixed token against the emulator)
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter
//! - Observability (tracing spans, metrics)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::retry::RetryConfig;
use crate::token_cache::{TokenCache, EMULATOR_TOKEN};
use crate::types::{Document, ListDocumentsResponse, Value};

/// Page size used when walking a whole collection.
const LIST_PAGE_SIZE: u32 = 300;

/// Whether `id` can name a document directly under a collection.
///
/// Firestore ids cannot contain `/`, cannot be `.` or `..` and cannot match
/// `__.*__`. Anything else would address a different path once the URL is
/// normalized, so such ids are treated as absent.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains('/')
        && !(id.len() > 4 && id.starts_with("__") && id.ends_with("__"))
}

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// `host:port` of a Firestore emulator; disables service-account auth
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                StoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(StoreError::auth_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            emulator_host: std::env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .filter(|h| !h.is_empty()),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firestore REST API client.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub fn new(config: FirestoreConfig) -> StoreResult<Self> {
        let (scheme_host, token_cache) = match &config.emulator_host {
            Some(host) => (
                format!("http://{}", host),
                TokenCache::fixed(EMULATOR_TOKEN),
            ),
            None => (
                "https://firestore.googleapis.com".to_string(),
                TokenCache::new(Self::create_auth_provider()?),
            ),
        };

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("gigboard-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            scheme_host, config.project_id, config.database_id
        );

        Ok(Self {
            http,
            config,
            base_url,
            token_cache: Arc::new(token_cache),
        })
    }

    fn create_auth_provider() -> StoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            StoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(StoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?)
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        )
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Send an authenticated request, re-authenticating once on an expired token.
    async fn send<F>(&self, build: F) -> StoreResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.token_cache.get_token().await?;
        let response = build(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(StoreError::from_http_status(
                401,
                format!("{} failed: {}", url, body),
            ));
        }

        debug!("Firestore access token expired, refreshing");
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;
        Ok(build(&token).send().await?)
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Get a document.
    pub async fn get_document(&self, collection: &str, doc_id: &str) -> StoreResult<Option<Document>> {
        if !is_valid_document_id(doc_id) {
            debug!(collection, doc_id, "Rejected invalid document id");
            return Ok(None);
        }
        let url = self.document_url(collection, doc_id);

        self.execute_request("get_document", collection, Some(doc_id), async {
            let response = self
                .send(|token| self.http.get(&url).bearer_auth(token))
                .await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<Document> {
        let url = format!("{}/{}", self.base_url, collection);
        let body = Document::new(fields);

        self.execute_request("create_document", collection, None, async {
            let response = self
                .send(|token| self.http.post(&url).bearer_auth(token).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Merge `fields` into an existing document.
    ///
    /// The write carries an `exists` precondition, so a missing document yields
    /// `Ok(None)` instead of being created.
    pub async fn update_existing_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<Option<Document>> {
        if !is_valid_document_id(doc_id) {
            debug!(collection, doc_id, "Rejected invalid document id");
            return Ok(None);
        }
        let mut params: Vec<String> = fields
            .keys()
            .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
            .collect();
        params.push("currentDocument.exists=true".to_string());
        let url = format!("{}?{}", self.document_url(collection, doc_id), params.join("&"));
        let body = Document::new(fields);

        self.execute_request("update_document", collection, Some(doc_id), async {
            let response = self
                .send(|token| self.http.patch(&url).bearer_auth(token).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete an existing document. Returns `false` if it did not exist.
    pub async fn delete_existing_document(&self, collection: &str, doc_id: &str) -> StoreResult<bool> {
        if !is_valid_document_id(doc_id) {
            debug!(collection, doc_id, "Rejected invalid document id");
            return Ok(false);
        }
        let url = format!(
            "{}?currentDocument.exists=true",
            self.document_url(collection, doc_id)
        );

        self.execute_request("delete_document", collection, Some(doc_id), async {
            let response = self
                .send(|token| self.http.delete(&url).bearer_auth(token))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// List one page of documents in a collection.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> StoreResult<ListDocumentsResponse> {
        let mut url = format!("{}/{}?pageSize={}", self.base_url, collection, page_size);
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        self.execute_request("list_documents", collection, None, async {
            let response = self
                .send(|token| self.http.get(&url).bearer_auth(token))
                .await?;

            match response.status() {
                StatusCode::OK => Ok(response.json().await?),
                // Collections that were never written to do not exist.
                StatusCode::NOT_FOUND => Ok(ListDocumentsResponse::default()),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Walk every page of a collection.
    pub async fn list_all_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .with_retry("list_documents", || {
                    self.list_documents(collection, LIST_PAGE_SIZE, page_token.as_deref())
                })
                .await?;

            documents.extend(page.documents.unwrap_or_default());

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }

    /// Execute with retry.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = StoreResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = match doc_id {
            Some(id) => info_span!("firestore_request", operation = %operation, collection = %collection, doc_id = %id),
            None => info_span!("firestore_request", operation = %operation, collection = %collection),
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_validates_project_id() {
        std::env::remove_var("GCP_PROJECT_ID");
        std::env::remove_var("FIREBASE_PROJECT_ID");
        assert!(FirestoreConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_defaults_and_emulator() {
        std::env::set_var("GCP_PROJECT_ID", "test-project");
        std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
        std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");

        let config = FirestoreConfig::from_env().unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.database_id, "(default)");
        assert_eq!(config.emulator_host.as_deref(), Some("localhost:8080"));

        let client = FirestoreClient::new(config).unwrap();
        assert_eq!(
            client.document_url("gigs", "g1"),
            "http://localhost:8080/v1/projects/test-project/databases/(default)/documents/gigs/g1"
        );

        std::env::remove_var("FIRESTORE_EMULATOR_HOST");
        std::env::remove_var("GCP_PROJECT_ID");
    }

    #[test]
    fn test_document_ids_outside_the_collection_are_invalid() {
        assert!(is_valid_document_id("g1"));
        assert!(is_valid_document_id("fix sink"));
        assert!(is_valid_document_id("..."));
        assert!(!is_valid_document_id(""));
        assert!(!is_valid_document_id("."));
        assert!(!is_valid_document_id(".."));
        assert!(!is_valid_document_id("../users/u1"));
        assert!(!is_valid_document_id("g1/sub/x"));
        assert!(!is_valid_document_id("__name__"));
    }

    #[test]
    fn test_document_url_encodes_the_id() {
        let config = FirestoreConfig {
            project_id: "test-project".to_string(),
            database_id: "(default)".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
            emulator_host: Some("localhost:8080".to_string()),
        };
        let client = FirestoreClient::new(config).unwrap();
        assert!(client
            .document_url("gigs", "a%2Fb c")
            .ends_with("/documents/gigs/a%252Fb%20c"));
    }
}
