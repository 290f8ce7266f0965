//! Telemetry types: LogEntry, LogPage, LogQuery, TimeRange, MetricSeries,
//! MergedPoint, AggregateSummary, Derived values and the report/snapshot outputs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Raw Log Data
// ============================================================================

/// One sample for one metric code at one instant, in physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub code: String,
    /// Epoch milliseconds
    pub event_time: i64,
    pub value: f64,
}

impl LogEntry {
    pub fn new(code: impl Into<String>, event_time: i64, value: f64) -> Self {
        Self {
            code: code.into(),
            event_time,
            value,
        }
    }
}

/// One page returned by the report-logs endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    /// Opaque cursor (`last_row_key`) for the next page
    pub next_cursor: String,
    pub has_more: bool,
}

/// Latest value of one code from the device-status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReading {
    pub code: String,
    pub value: f64,
}

/// Parameters for one paginated log retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogQuery {
    pub device_id: String,
    pub codes: Vec<String>,
    pub range: TimeRange,
    pub page_size: u32,
}

// ============================================================================
// Time Ranges
// ============================================================================

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Query window in epoch milliseconds, inclusive on both ends upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Window of `days` days ending at `now_ms`.
    pub fn last_days(days: i64, now_ms: i64) -> Self {
        Self {
            start_ms: now_ms - days * MS_PER_DAY,
            end_ms: now_ms,
        }
    }

    pub fn contains(&self, time_ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&time_ms)
    }

    pub fn is_empty(&self) -> bool {
        self.end_ms < self.start_ms
    }
}

/// Dashboard range presets, all ending "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    LastDay,
    Last3Days,
    Last7Days,
    LastMonth,
    Last3Months,
    LastYear,
}

impl RangePreset {
    pub fn days(self) -> i64 {
        match self {
            Self::LastDay => 1,
            Self::Last3Days => 3,
            Self::Last7Days => 7,
            Self::LastMonth => 30,
            Self::Last3Months => 90,
            Self::LastYear => 365,
        }
    }

    pub fn ending_at(self, now_ms: i64) -> TimeRange {
        TimeRange::last_days(self.days(), now_ms)
    }
}

impl FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" | "day" | "last_day" => Ok(Self::LastDay),
            "3d" | "last_3_days" => Ok(Self::Last3Days),
            "7d" | "week" | "last_7_days" => Ok(Self::Last7Days),
            "30d" | "month" | "last_month" => Ok(Self::LastMonth),
            "90d" | "last_3_months" => Ok(Self::Last3Months),
            "365d" | "year" | "last_year" => Ok(Self::LastYear),
            other => Err(format!(
                "unknown range '{other}' (expected 1d, 3d, 7d, 30d, 90d or 365d)"
            )),
        }
    }
}

// ============================================================================
// Series and Merged Points
// ============================================================================

/// Entries of a single code ordered by event time ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    code: String,
    entries: Vec<LogEntry>,
}

impl MetricSeries {
    /// Builds a series; entries are stably sorted so equal timestamps keep
    /// their retrieval order.
    pub fn new(code: impl Into<String>, mut entries: Vec<LogEntry>) -> Self {
        entries.sort_by_key(|e| e.event_time);
        Self {
            code: code.into(),
            entries,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.value)
    }
}

/// Value of one code inside a merged point; `None` when the code has no
/// sample at that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeValue {
    pub code: String,
    pub value: Option<f64>,
}

/// One row per distinct event time across all requested series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub time: i64,
    /// One slot per requested code, in declaration order
    pub values: Vec<CodeValue>,
}

impl MergedPoint {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.code == code)
            .and_then(|v| v.value)
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Window statistics for one code. `Absent` means the window held no
/// samples; it is never reported as zero or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WindowStats {
    Absent,
    Present { max: f64, min: f64, samples: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub code: String,
    pub stats: WindowStats,
}

impl AggregateSummary {
    pub fn absent(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            stats: WindowStats::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.stats, WindowStats::Absent)
    }

    pub fn max(&self) -> Option<f64> {
        match self.stats {
            WindowStats::Present { max, .. } => Some(max),
            WindowStats::Absent => None,
        }
    }

    pub fn min(&self) -> Option<f64> {
        match self.stats {
            WindowStats::Present { min, .. } => Some(min),
            WindowStats::Absent => None,
        }
    }

    /// Daily amplitude (`max - min`).
    pub fn spread(&self) -> Option<f64> {
        match self.stats {
            WindowStats::Present { max, min, .. } => Some(max - min),
            WindowStats::Absent => None,
        }
    }
}

// ============================================================================
// Derived Metrics
// ============================================================================

/// Why a derived metric could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ComputationUndefined {
    #[error("relative humidity must be greater than zero")]
    NonPositiveHumidity,
    #[error("temperature makes the formula divide by zero")]
    SingularTemperature,
    #[error("input or result is not a finite number")]
    NonFinite,
    #[error("temperature or humidity reading is unavailable")]
    MissingInput,
}

/// A derived value or the reason it is not computable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derived {
    Value(f64),
    NotComputable(ComputationUndefined),
}

impl Derived {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotComputable(_) => None,
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Result<f64, ComputationUndefined>> for Derived {
    fn from(result: Result<f64, ComputationUndefined>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(reason) => Self::NotComputable(reason),
        }
    }
}

impl fmt::Display for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::NotComputable(_) => write!(f, "N/A"),
        }
    }
}

/// Merged point with VPD and dew point derived from its climate codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub time: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub vpd: Derived,
    pub dew_point: Derived,
}

// ============================================================================
// Outputs
// ============================================================================

/// Current climate plus the window's min/max for temperature and humidity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub vpd: Derived,
    pub dew_point: Derived,
    pub temperature_window: AggregateSummary,
    pub humidity_window: AggregateSummary,
}

/// Result of one fetch/merge/aggregate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    pub device_id: String,
    pub range: TimeRange,
    pub codes: Vec<String>,
    pub total_entries: usize,
    pub summaries: Vec<AggregateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<MergedPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<Vec<DerivedPoint>>,
}

impl TelemetryReport {
    pub fn summary(&self, code: &str) -> Option<&AggregateSummary> {
        self.summaries.iter().find(|s| s.code == code)
    }
}
