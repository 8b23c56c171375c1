//! Gig lifecycle: validation, persistence and change notifications.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use gigboard_events::ChangeNotifier;
use gigboard_models::{
    ChangeEvent, Gig, GigId, GigUpdate, InvalidFields, NewGig, StatusError, StatusUpdate,
};
use gigboard_store::{GigRepository, StoreError};

#[derive(Debug, Error)]
pub enum GigServiceError {
    #[error(transparent)]
    InvalidFields(#[from] InvalidFields),

    #[error(transparent)]
    InvalidStatus(#[from] StatusError),

    #[error("Gig not found: {0}")]
    NotFound(GigId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type GigServiceResult<T> = Result<T, GigServiceError>;

/// Gig operations. Every successful mutation is announced after the store write.
#[derive(Clone)]
pub struct GigService {
    repo: GigRepository,
    notifier: ChangeNotifier,
}

impl GigService {
    pub fn new(repo: GigRepository, notifier: ChangeNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Validate and persist a new gig, defaulting its status to open.
    pub async fn create(&self, input: NewGig, posted_by: Option<String>) -> GigServiceResult<Gig> {
        let draft = input.validate()?;
        let record = draft.into_record(posted_by, Utc::now());

        let gig = self
            .repo
            .insert(&record)
            .await
            .map_err(store_failure("create"))?;

        info!(gig_id = %gig.id, "Gig created");
        self.notifier.notify(ChangeEvent::created(gig.clone()));
        Ok(gig)
    }

    pub async fn list_all(&self) -> GigServiceResult<Vec<Gig>> {
        self.repo.list().await.map_err(store_failure("list"))
    }

    pub async fn get_by_id(&self, id: &GigId) -> GigServiceResult<Gig> {
        self.repo
            .get(id)
            .await
            .map_err(store_failure("get"))?
            .ok_or_else(|| GigServiceError::NotFound(id.clone()))
    }

    /// Apply any subset of editable fields.
    pub async fn update(&self, id: &GigId, update: GigUpdate) -> GigServiceResult<Gig> {
        update.validate()?;

        let gig = self
            .repo
            .update(id, &update, Utc::now())
            .await
            .map_err(store_failure("update"))?
            .ok_or_else(|| GigServiceError::NotFound(id.clone()))?;

        info!(gig_id = %gig.id, "Gig updated");
        self.notifier.notify(ChangeEvent::updated(gig.clone()));
        Ok(gig)
    }

    /// Change only the status. The status is checked before the store is touched.
    pub async fn update_status(&self, id: &GigId, request: StatusUpdate) -> GigServiceResult<Gig> {
        let status = request.resolve()?;

        let gig = self
            .repo
            .set_status(id, status, Utc::now())
            .await
            .map_err(store_failure("update_status"))?
            .ok_or_else(|| GigServiceError::NotFound(id.clone()))?;

        info!(gig_id = %gig.id, status = %status, "Gig status changed");
        self.notifier.notify(ChangeEvent::status_changed(gig.clone()));
        Ok(gig)
    }

    /// Remove a gig, returning its last state.
    pub async fn delete(&self, id: &GigId) -> GigServiceResult<Gig> {
        let gig = self
            .repo
            .delete(id)
            .await
            .map_err(store_failure("delete"))?
            .ok_or_else(|| GigServiceError::NotFound(id.clone()))?;

        info!(gig_id = %gig.id, "Gig deleted");
        self.notifier.notify(ChangeEvent::deleted(gig.id.clone()));
        Ok(gig)
    }

    /// Case-insensitive substring search; absent or empty filters match everything.
    pub async fn search(
        &self,
        title: Option<&str>,
        location: Option<&str>,
    ) -> GigServiceResult<Vec<Gig>> {
        self.repo
            .search(title, location)
            .await
            .map_err(store_failure("search"))
    }
}

fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> GigServiceError {
    move |e| {
        error!(operation, "Gig store operation failed: {}", e);
        GigServiceError::Store(e)
    }
}
