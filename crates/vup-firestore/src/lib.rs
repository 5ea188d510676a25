//! Firestore REST API client and video record store.
//!
//! This crate provides:
//! - The `VideoRepository` trait with Firestore and in-memory implementations
//! - Service account authentication via gcp_auth with token caching
//! - Retry with exponential backoff, request spans and metrics

pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod video_repo;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use retry::RetryConfig;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
pub use video_repo::{
    FirestoreVideoRepository, InMemoryVideoRepository, VideoRepository, DEFAULT_VIDEOS_COLLECTION,
};
