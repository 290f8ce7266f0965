//! Cooldown and recommendation storage
//!
//! Both stores are traits so the recommendation service can run against
//! sled in the binary and in memory in tests.

mod persistence;
mod sled_store;

pub use persistence::{CooldownStore, InMemoryStore, RecommendationStore, StoreError};
pub use sled_store::SledStore;
