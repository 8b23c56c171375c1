//! Axum HTTP API server for the gig marketplace.
//!
//! This crate provides:
//! - REST endpoints for the gig lifecycle (create, list, search, update, status, delete)
//! - HS256 bearer token authentication backed by the `users` collection
//! - A WebSocket change feed fed by the in-process event hub
//! - Security headers, request ids and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;

pub use auth::{AuthError, AuthUser, Authenticator, Claims};
pub use config::{ApiConfig, ConfigError, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{GigService, GigServiceError};
pub use state::AppState;
