//! growmonitor: grow-room telemetry aggregation and derived climate metrics
//!
//! ## Architecture
//!
//! - **Acquisition**: device-cloud client, offline dump source, bounded paginated fetcher
//! - **Processing**: per-code partitioning, window aggregates, exact-time stream merge
//! - **Physics Engine**: vapor pressure deficit and dew point
//! - **Pipeline**: report and status flows over a device cloud
//! - **Recommendation**: per-user cooldown gate in front of an advice generator

pub mod acquisition;
pub mod config;
pub mod physics_engine;
pub mod pipeline;
pub mod processing;
pub mod recommendation;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    AggregateSummary, ComputationUndefined, Derived, GateState, LogEntry, MergedPoint,
    RecommendationOutcome, StatusSnapshot, TelemetryReport, TimeRange, WindowStats,
};

// Re-export acquisition and pipeline entry points
pub use acquisition::{CloudClient, DeviceCloud, FetchError, FileSource, LogFetcher};
pub use pipeline::{ReportRequest, TelemetryCoordinator, TelemetryError};

// Re-export recommendation components
pub use recommendation::{CooldownGate, RecommendationService};
pub use storage::{CooldownStore, InMemoryStore, RecommendationStore, SledStore, StoreError};
