//! Request handlers.

pub mod auth;
pub mod gigs;
pub mod health;

pub use auth::*;
pub use gigs::*;
pub use health::*;
