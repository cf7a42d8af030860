//! Persistence abstraction for per-user streak documents.

use crate::domain::{StreakRecord, UserId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpStreakStore;
pub use memory::MemoryStreakStore;

/// Durable key-value store holding one streak document per user.
///
/// Writes are last-writer-wins overwrites of the whole document. Nothing is
/// merged: two sessions racing a read-modify-write for the same user can lose
/// one update. Dropping an in-flight future stops waiting on it but does not
/// roll back a write the backend already received.
#[async_trait]
pub trait StreakStore: Send + Sync + fmt::Debug {
    /// Load the document for `user`. A missing document is `Ok(None)`.
    async fn get_snapshot(&self, user: &UserId) -> Result<Option<StreakRecord>, StoreError>;

    /// Replace the document for `user`.
    async fn put_snapshot(&self, user: &UserId, record: &StreakRecord) -> Result<(), StoreError>;
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend rejected the caller's identity.
    #[error("not authenticated")]
    NotAuthenticated,
    /// Transient I/O failure; the operation may be retried later.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The stored document exists but cannot be decoded.
    #[error("stored streak for {user} is unreadable: {reason}")]
    Corrupt { user: String, reason: String },
}
