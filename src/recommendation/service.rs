//! Recommendation Service - gate, generate, persist
//!
//! ```text
//! check gate ──CoolingDown──> return (nothing written, generator not called)
//!     │
//!  Available
//!     ▼
//! generate ──error/empty──> return error (nothing written)
//!     ▼
//! set cooldown(now) ─> append recommendation ─> Granted
//! ```
//!
//! The cooldown is written first: if it cannot be stored, no recommendation
//! is kept and a retry does not yield a second one inside the window. If the
//! append fails after that, the window is consumed without a stored record.
//!
//! The gate read and the cooldown write are not atomic; two concurrent
//! requests for one user can both be granted (last write wins).

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::gate::CooldownGate;
use super::generator::{GeneratorError, RecommendationGenerator};
use crate::storage::{CooldownStore, RecommendationStore, StoreError};
use crate::types::{
    format_remaining, GateState, RecommendationContext, RecommendationOutcome,
    RecommendationRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("generation failed: {0}")]
    Generator(#[from] GeneratorError),
}

pub struct RecommendationService {
    gate: CooldownGate,
    cooldowns: Arc<dyn CooldownStore>,
    recommendations: Arc<dyn RecommendationStore>,
    generator: Arc<dyn RecommendationGenerator>,
}

impl RecommendationService {
    pub fn new(
        gate: CooldownGate,
        cooldowns: Arc<dyn CooldownStore>,
        recommendations: Arc<dyn RecommendationStore>,
        generator: Arc<dyn RecommendationGenerator>,
    ) -> Self {
        Self {
            gate,
            cooldowns,
            recommendations,
            generator,
        }
    }

    /// Gate state for a user without side effects.
    pub fn state(&self, user_id: &str, now: DateTime<Utc>) -> Result<GateState, StoreError> {
        self.gate.check(self.cooldowns.as_ref(), user_id, now)
    }

    pub fn latest(&self, user_id: &str) -> Result<Option<RecommendationRecord>, StoreError> {
        self.recommendations.latest(user_id)
    }

    pub fn history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, StoreError> {
        self.recommendations.history(user_id, limit)
    }

    pub async fn request(
        &self,
        context: &RecommendationContext,
        now: DateTime<Utc>,
    ) -> Result<RecommendationOutcome, RecommendationError> {
        let user_id = context.user_id.as_str();

        if let GateState::CoolingDown { until, remaining } = self.state(user_id, now)? {
            info!(
                user = user_id,
                remaining = %format_remaining(remaining),
                "Recommendation refused, cooldown active"
            );
            return Ok(RecommendationOutcome::CoolingDown { until, remaining });
        }

        let message = self.generator.generate(context).await.map_err(|e| {
            warn!(user = user_id, backend = self.generator.backend_name(), error = %e, "Recommendation generation failed");
            e
        })?;
        let message = message.trim();
        if message.is_empty() {
            return Err(GeneratorError::EmptyResponse.into());
        }

        let record = RecommendationRecord::new(user_id, now, message);
        self.cooldowns.set(user_id, now)?;
        self.recommendations.append(&record)?;

        info!(
            user = user_id,
            backend = self.generator.backend_name(),
            store = self.cooldowns.backend_name(),
            "Recommendation granted"
        );
        Ok(RecommendationOutcome::Granted(record))
    }
}
