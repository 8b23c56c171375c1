//! Document store adapters for Gigboard.
//!
//! This crate provides:
//! - The `DocumentStore` abstraction (insert / find / update / delete by id)
//! - An in-memory backend used by default and in tests
//! - A Firestore REST backend with token caching, retry and metrics
//! - Typed repositories for gigs and users

pub mod client;
pub mod document;
pub mod error;
pub mod firestore_store;
pub mod memory;
pub mod metrics;
pub mod repos;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use document::{DocumentStore, Fields, Filter, StoredDocument};
pub use error::{StoreError, StoreResult};
pub use firestore_store::FirestoreStore;
pub use memory::MemoryStore;
pub use repos::{GigRepository, UserRepository, GIGS_COLLECTION, USERS_COLLECTION};
pub use retry::RetryConfig;
