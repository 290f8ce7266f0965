//! Per-user recommendation cooldown gate

use chrono::{DateTime, Duration, Utc};

use crate::config::RecommendationConfig;
use crate::storage::{CooldownStore, StoreError};
use crate::types::{CooldownRecord, GateState};

/// Allows one recommendation per user per window. Read-only: recording a
/// grant is the caller's job.
#[derive(Debug, Clone, Copy)]
pub struct CooldownGate {
    window: Duration,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self::new(config.cooldown())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Gate state given the user's stored record (if any).
    ///
    /// A timestamp in the future keeps the gate closed until `last + window`.
    pub fn evaluate(
        &self,
        record: Option<&CooldownRecord>,
        now: DateTime<Utc>,
    ) -> Result<GateState, StoreError> {
        let Some(record) = record else {
            return Ok(GateState::Available);
        };
        let last = record
            .parsed_timestamp()
            .ok_or_else(|| StoreError::InvalidTimestamp {
                user_id: record.user_id.clone(),
                value: record.last_timestamp.clone(),
            })?;

        if now - last >= self.window {
            return Ok(GateState::Available);
        }
        let until = last
            .checked_add_signed(self.window)
            .ok_or_else(|| StoreError::TimestampOverflow {
                user_id: record.user_id.clone(),
            })?;
        Ok(GateState::CoolingDown {
            until,
            remaining: until - now,
        })
    }

    pub fn check(
        &self,
        store: &dyn CooldownStore,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GateState, StoreError> {
        let record = store.get(user_id)?;
        self.evaluate(record.as_ref(), now)
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(Duration::hours(i64::from(crate::config::defaults::COOLDOWN_HOURS)))
    }
}
