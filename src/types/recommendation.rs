//! Recommendation types: CooldownRecord, RecommendationRecord, GateState,
//! RecommendationOutcome, RecommendationContext

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::StatusSnapshot;

/// Last successful recommendation time for one user. One per user,
/// overwritten on every grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRecord {
    pub user_id: String,
    /// RFC 3339 timestamp
    pub last_timestamp: String,
}

impl CooldownRecord {
    pub fn new(user_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            last_timestamp: format_timestamp(at),
        }
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// A generated recommendation as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub user_id: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub message: String,
}

impl RecommendationRecord {
    pub fn new(user_id: impl Into<String>, at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: format_timestamp(at),
            message: message.into(),
        }
    }
}

/// Persisted timestamp format: millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Cooldown gate state for one user at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Available,
    CoolingDown {
        until: DateTime<Utc>,
        remaining: Duration,
    },
}

impl GateState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// What a recommendation request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Granted(RecommendationRecord),
    CoolingDown {
        until: DateTime<Utc>,
        remaining: Duration,
    },
}

/// Input handed to the recommendation generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub user_id: String,
    pub snapshot: StatusSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Formats a wait as `"{h}h {m}m {s}s"`; negative durations print as zero.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
