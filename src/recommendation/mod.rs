//! Cooldown-gated recommendations
//!
//! The gate decides whether a user may receive advice now; the service runs
//! the generator behind it and records successful grants.

mod gate;
mod generator;
mod service;

pub use gate::CooldownGate;
pub use generator::{GeneratorError, HttpGenerator, RecommendationGenerator};
pub use service::{RecommendationError, RecommendationService};
