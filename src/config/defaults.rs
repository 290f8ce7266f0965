//! System-wide default constants.
//!
//! Centralises magic numbers used by the config defaults and the binaries.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Device Cloud
// ============================================================================

/// Regional OpenAPI endpoint the device cloud is reached through.
pub const DEVICE_CLOUD_BASE_URL: &str = "https://openapi.tuyaus.com";

/// HTTP client timeout for a single device-cloud request (seconds).
pub const DEVICE_CLOUD_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Telemetry
// ============================================================================

/// Metric code reporting air temperature (tenths of a degree Celsius).
pub const TEMPERATURE_CODE: &str = "va_temperature";

/// Metric code reporting relative humidity (percent).
pub const HUMIDITY_CODE: &str = "va_humidity";

/// Raw-to-physical divisor for the temperature code.
pub const TEMPERATURE_DIVISOR: f64 = 10.0;

/// Log entries requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Largest page the report-logs endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Safety bound on the number of pages a single fetch may request.
///
/// 500 pages x 100 entries covers a year of two codes sampled every ~10 min.
pub const MAX_PAGES: u32 = 500;

/// Window used for the status snapshot min/max summaries (hours).
pub const STATUS_WINDOW_HOURS: i64 = 24;

// ============================================================================
// Recommendations
// ============================================================================

/// Minimum interval between two recommendations for one user (hours).
pub const COOLDOWN_HOURS: u32 = 24;

/// Longest accepted cooldown window (one year)
pub const MAX_COOLDOWN_HOURS: u32 = 8760;

/// Maximum time to wait for the recommendation generator (seconds).
pub const GENERATOR_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Storage
// ============================================================================

/// Default data directory for the sled database.
pub const DATA_DIR: &str = "./data";

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "growmonitor.db";
