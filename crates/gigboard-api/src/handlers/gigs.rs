//! Gig handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use gigboard_models::{Gig, GigId, GigUpdate, NewGig, StatusUpdate};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GigResponse {
    pub success: bool,
    pub gig: Gig,
}

impl GigResponse {
    fn ok(gig: Gig) -> Json<Self> {
        Json(Self { success: true, gig })
    }
}

#[derive(Debug, Serialize)]
pub struct GigListResponse {
    pub success: bool,
    pub gigs: Vec<Gig>,
}

impl GigListResponse {
    fn ok(gigs: Vec<Gig>) -> Json<Self> {
        Json(Self {
            success: true,
            gigs,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Search filters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a gig owned by the caller.
pub async fn create_gig(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewGig>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GigResponse>)> {
    let Json(input) = payload?;
    let gig = state.gigs.create(input, Some(user.id().to_string())).await?;
    Ok((StatusCode::CREATED, GigResponse::ok(gig)))
}

pub async fn list_gigs(State(state): State<AppState>) -> ApiResult<Json<GigListResponse>> {
    let gigs = state.gigs.list_all().await?;
    Ok(GigListResponse::ok(gigs))
}

pub async fn search_gigs(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<GigListResponse>> {
    let gigs = state
        .gigs
        .search(query.title.as_deref(), query.location.as_deref())
        .await?;
    Ok(GigListResponse::ok(gigs))
}

pub async fn get_gig(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GigResponse>> {
    let gig = state.gigs.get_by_id(&GigId::from(id)).await?;
    Ok(GigResponse::ok(gig))
}

pub async fn update_gig(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<GigUpdate>, JsonRejection>,
) -> ApiResult<Json<GigResponse>> {
    let Json(update) = payload?;
    let gig = state.gigs.update(&GigId::from(id), update).await?;
    Ok(GigResponse::ok(gig))
}

pub async fn update_gig_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<GigResponse>> {
    let Json(request) = payload?;
    let gig = state.gigs.update_status(&GigId::from(id), request).await?;
    Ok(GigResponse::ok(gig))
}

pub async fn delete_gig(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.gigs.delete(&GigId::from(id)).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Gig deleted".to_string(),
    }))
}
