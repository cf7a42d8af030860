//! In-memory streak store for tests and local runs.

use super::{StoreError, StreakStore};
use crate::domain::{StreakRecord, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Store backed by a `HashMap`, with a switch to simulate an outage.
#[derive(Debug, Default)]
pub struct MemoryStreakStore {
    records: RwLock<HashMap<UserId, StreakRecord>>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStreakStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document for a user.
    pub fn with_record(mut self, user: UserId, record: StreakRecord) -> Self {
        self.records.get_mut().insert(user, record);
        self
    }

    /// Make every subsequent call fail with `StorageUnavailable` (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get_snapshot` calls that reached the store.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful `put_snapshot` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current document for a user, bypassing the outage switch.
    pub async fn record(&self, user: &UserId) -> Option<StreakRecord> {
        self.records.read().await.get(user).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::StorageUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StreakStore for MemoryStreakStore {
    async fn get_snapshot(&self, user: &UserId) -> Result<Option<StreakRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.records.read().await.get(user).cloned())
    }

    async fn put_snapshot(&self, user: &UserId, record: &StreakRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.records
            .write()
            .await
            .insert(user.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
