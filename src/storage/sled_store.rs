//! Sled-backed stores
//!
//! One database, two named trees:
//! - `cooldowns`: user id -> JSON `CooldownRecord`
//! - `recommendations`: big-endian user id length, user id, big-endian
//!   sequence id -> JSON `RecommendationRecord`, so a prefix scan yields
//!   exactly one user's records in insertion order.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};

use super::persistence::{CooldownStore, RecommendationStore, StoreError};
use crate::types::{CooldownRecord, RecommendationRecord};

const COOLDOWN_TREE: &str = "cooldowns";
const RECOMMENDATION_TREE: &str = "recommendations";

#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    cooldowns: sled::Tree,
    recommendations: sled::Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        let cooldowns = db.open_tree(COOLDOWN_TREE)?;
        let recommendations = db.open_tree(RECOMMENDATION_TREE)?;

        info!(path = %path.display(), users = cooldowns.len(), "Recommendation store opened");

        Ok(Self {
            db,
            cooldowns,
            recommendations,
        })
    }

    /// Writes a record as-is, without re-formatting the timestamp.
    pub fn put_cooldown(&self, record: &CooldownRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        self.cooldowns.insert(record.user_id.as_bytes(), bytes)?;
        self.cooldowns.flush()?;
        Ok(())
    }

    /// Length-prefixed so no user id is a key prefix of another.
    fn user_prefix(user_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(user_id.len() + 8);
        prefix.extend_from_slice(&(user_id.len() as u64).to_be_bytes());
        prefix.extend_from_slice(user_id.as_bytes());
        prefix
    }
}

impl CooldownStore for SledStore {
    fn get(&self, user_id: &str) -> Result<Option<CooldownRecord>, StoreError> {
        match self.cooldowns.get(user_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let record = CooldownRecord::new(user_id, at);
        self.put_cooldown(&record)?;
        debug!(user = user_id, at = %record.last_timestamp, "Cooldown record written");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

impl RecommendationStore for SledStore {
    fn append(&self, record: &RecommendationRecord) -> Result<(), StoreError> {
        let mut key = Self::user_prefix(&record.user_id);
        key.extend_from_slice(&self.db.generate_id()?.to_be_bytes());

        let bytes = serde_json::to_vec(record)?;
        self.recommendations.insert(key, bytes)?;
        self.recommendations.flush()?;
        Ok(())
    }

    fn latest(&self, user_id: &str) -> Result<Option<RecommendationRecord>, StoreError> {
        match self
            .recommendations
            .scan_prefix(Self::user_prefix(user_id))
            .next_back()
        {
            Some(item) => {
                let (_key, value) = item?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    fn history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, StoreError> {
        let mut records = Vec::new();
        for item in self
            .recommendations
            .scan_prefix(Self::user_prefix(user_id))
            .rev()
            .take(limit)
        {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_cooldown_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SledStore::open(dir.path()).unwrap();
            store.set("grower", at(7)).unwrap();
        }
        let store = SledStore::open(dir.path()).unwrap();
        let record = CooldownStore::get(&store, "grower").unwrap().unwrap();
        assert_eq!(record.last_timestamp, "2026-03-01T07:00:00.000Z");
    }

    #[test]
    fn test_latest_is_per_user_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        store.append(&RecommendationRecord::new("ann", at(1), "water less")).unwrap();
        store.append(&RecommendationRecord::new("anna", at(2), "prefix neighbour")).unwrap();
        store.append(&RecommendationRecord::new("ann", at(3), "raise humidity")).unwrap();

        let latest = store.latest("ann").unwrap().unwrap();
        assert_eq!(latest.message, "raise humidity");

        let history = store.history("ann", 5).unwrap();
        let messages: Vec<&str> = history.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["raise humidity", "water less"]);

        assert!(store.latest("bob").unwrap().is_none());
    }

    #[test]
    fn test_user_ids_with_nul_stay_separate() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        store.append(&RecommendationRecord::new("a\0b", at(1), "other user")).unwrap();
        store.append(&RecommendationRecord::new("a", at(2), "mine")).unwrap();
        store.append(&RecommendationRecord::new("a\0", at(3), "also other")).unwrap();

        let history = store.history("a", 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "mine");
        assert_eq!(store.latest("a\0b").unwrap().unwrap().message, "other user");
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        store.cooldowns.insert("u", b"not json".to_vec()).unwrap();
        assert!(matches!(
            CooldownStore::get(&store, "u"),
            Err(StoreError::Serialization(_))
        ));
    }
}
