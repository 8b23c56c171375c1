//! Current-user handler.

use axum::Json;
use serde::Serialize;

use gigboard_models::UserProfile;

use crate::auth::AuthUser;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Profile of the authenticated caller.
pub async fn current_user(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user: user.0,
    })
}
