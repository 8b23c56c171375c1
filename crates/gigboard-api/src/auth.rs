//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. The subject is read from the
//! `id` claim (falling back to `sub`) and resolved against the `users` collection.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use gigboard_models::UserProfile;
use gigboard_store::{StoreError, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Standard subject, used when `id` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.sub.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Verifies bearer tokens and loads the caller's profile.
#[derive(Clone)]
pub struct Authenticator {
    key: DecodingKey,
    validation: Validation,
    users: UserRepository,
}

impl Authenticator {
    pub fn new(secret: &str, users: UserRepository) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            users,
        }
    }

    /// Extract the token from an `Authorization: Bearer <token>` header.
    pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?
            .trim();

        let mut parts = header.splitn(2, ' ');
        let scheme = parts.next().unwrap_or_default();
        let token = parts.next().map(str::trim).unwrap_or_default();

        if !scheme.eq_ignore_ascii_case("bearer") {
            return if header.is_empty() {
                Err(AuthError::MissingToken)
            } else {
                Err(AuthError::InvalidToken)
            };
        }
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(token)
    }

    /// Check signature and expiry, returning the subject identifier.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            AuthError::InvalidToken
        })?;

        data.claims
            .subject()
            .map(str::to_string)
            .ok_or(AuthError::InvalidToken)
    }

    /// Load the profile for a verified subject.
    pub async fn load_user(&self, user_id: &str) -> Result<UserProfile, AuthError> {
        match self.users.load_profile(user_id).await? {
            Some(profile) => Ok(profile),
            None => {
                warn!(user_id, "Token subject has no user record");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Run both steps against request headers.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<UserProfile, AuthError> {
        let token = Self::bearer_token(headers)?;
        let user_id = self.verify(token)?;
        self.load_user(&user_id).await
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.0
    }
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let profile = state.auth.authenticate(&parts.headers).await?;
        Ok(AuthUser(profile))
    }
}
