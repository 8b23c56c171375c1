//! Shared data models for the Gigboard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Gig listings and their lifecycle status
//! - Create / update / status-patch inputs with validation
//! - Change events published after gig mutations
//! - User profiles resolved by the authentication gate

pub mod event;
pub mod gig;
pub mod user;

// Re-export common types
pub use event::{ChangeEvent, EventKind, EventPayload};
pub use gig::{
    Gig, GigDraft, GigId, GigRecord, GigStatus, GigUpdate, InvalidFields, NewGig, StatusError,
    StatusUpdate,
};
pub use user::{UserProfile, SECRET_FIELDS};
