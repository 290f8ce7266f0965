//! Device-cloud data acquisition
//!
//! [`DeviceCloud`] abstracts the two upstream endpoints the core consumes:
//! paginated report logs and the latest device status. Implementations:
//!
//! - [`CloudClient`]: HTTP client for the device-cloud OpenAPI
//! - [`FileSource`]: offline replay of a JSON log dump
//!
//! [`LogFetcher`] drives a `DeviceCloud` page by page until exhaustion.

pub mod client;
pub mod fetcher;
pub mod file_source;
pub mod wire;

pub use client::CloudClient;
pub use fetcher::{FetchError, FetchLimits, LogFetcher};
pub use file_source::FileSource;
pub use wire::{RawLog, ValueScaling};

use async_trait::async_trait;

use crate::types::{LogPage, LogQuery, StatusReading};

/// Errors from a single upstream call.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("API rejected request (code {code}): {message}")]
    Api { code: String, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Protocol violation: {0}")]
    Protocol(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upstream device cloud.
///
/// Implementations perform exactly one request per call and never retry;
/// retry policy, if any, belongs to the transport underneath.
#[async_trait]
pub trait DeviceCloud: Send + Sync {
    /// Fetch one page of logs starting at `cursor` (empty for the first page).
    async fn report_logs(&self, query: &LogQuery, cursor: &str) -> Result<LogPage, CloudError>;

    /// Latest numeric reading per code.
    async fn device_status(&self, device_id: &str) -> Result<Vec<StatusReading>, CloudError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}
