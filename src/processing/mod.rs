//! Stream merging, window aggregation and snapshot assembly
//!
//! Everything here is pure: the same entries always produce the same series,
//! merged points and summaries.

pub mod merge;
pub mod series;
pub mod snapshot;

pub use merge::{derive_points, merge_points};
pub use series::{partition_by_code, summarize, summarize_all, unique_codes};
pub use snapshot::{assemble_snapshot, LatestReading};
