//! Business logic services.

pub mod gig;

pub use gig::{GigService, GigServiceError};
