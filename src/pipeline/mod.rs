//! Telemetry pipeline
//!
//! Wires acquisition, processing and the psychrometric calculator into the
//! two read flows the application exposes: historical reports and the
//! current status snapshot.

mod coordinator;

pub use coordinator::{ReportRequest, TelemetryCoordinator, TelemetryError};
