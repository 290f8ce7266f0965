//! Cooldown and recommendation persistence traits
//!
//! Two backends implement both traits:
//! - `InMemoryStore`: tests and one-shot runs, lost on exit
//! - `SledStore`: durable, named trees in one sled database

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{CooldownRecord, RecommendationRecord};

/// Per-user last-recommendation timestamps.
pub trait CooldownStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<CooldownRecord>, StoreError>;

    /// Overwrites any existing record for the user.
    fn set(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Append-only log of generated recommendations.
pub trait RecommendationStore: Send + Sync {
    fn append(&self, record: &RecommendationRecord) -> Result<(), StoreError>;

    fn latest(&self, user_id: &str) -> Result<Option<RecommendationRecord>, StoreError>;

    /// Most recent first.
    fn history(&self, user_id: &str, limit: usize)
        -> Result<Vec<RecommendationRecord>, StoreError>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("stored timestamp for user {user_id} is not RFC 3339: {value:?}")]
    InvalidTimestamp { user_id: String, value: String },
    #[error("cooldown for user {user_id} ends outside the representable time range")]
    TimestampOverflow { user_id: String },
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// In-memory store. Thread-safe via `RwLock`; not durable.
#[derive(Default)]
pub struct InMemoryStore {
    cooldowns: RwLock<HashMap<String, CooldownRecord>>,
    recommendations: RwLock<Vec<RecommendationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw record, bypassing timestamp formatting.
    pub fn insert_raw(&self, record: CooldownRecord) -> Result<(), StoreError> {
        self.cooldowns
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .insert(record.user_id.clone(), record);
        Ok(())
    }
}

impl CooldownStore for InMemoryStore {
    fn get(&self, user_id: &str) -> Result<Option<CooldownRecord>, StoreError> {
        let store = self
            .cooldowns
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(store.get(user_id).cloned())
    }

    fn set(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.insert_raw(CooldownRecord::new(user_id, at))
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

impl RecommendationStore for InMemoryStore {
    fn append(&self, record: &RecommendationRecord) -> Result<(), StoreError> {
        self.recommendations
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .push(record.clone());
        Ok(())
    }

    fn latest(&self, user_id: &str) -> Result<Option<RecommendationRecord>, StoreError> {
        Ok(self.history(user_id, 1)?.into_iter().next())
    }

    fn history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, StoreError> {
        let store = self
            .recommendations
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(store
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
