//! Shared data structures for grow-room telemetry
//!
//! - Raw retrieval: LogEntry, LogPage, LogQuery, TimeRange, StatusReading
//! - Processing: MetricSeries, MergedPoint, AggregateSummary, Derived
//! - Outputs: StatusSnapshot, TelemetryReport
//! - Recommendations: CooldownRecord, RecommendationRecord, GateState

mod telemetry;
mod recommendation;

pub use telemetry::*;
pub use recommendation::*;
