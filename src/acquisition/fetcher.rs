//! Paginated log retrieval.
//!
//! Pages are requested strictly in sequence: page N+1 needs the cursor page N
//! returned. The loop is bounded by `max_pages` and optionally by an overall
//! deadline. A fetch either returns every entry or an error; partial
//! accumulations are dropped.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{CloudError, DeviceCloud};
use crate::config::TelemetryConfig;
use crate::types::{LogEntry, LogQuery};

/// Why a paginated fetch produced no data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed on page {page}: {source}")]
    UpstreamRequestFailed {
        page: u32,
        #[source]
        source: CloudError,
    },
    #[error("pagination exceeded {max_pages} pages without reaching the end")]
    PaginationExceeded { max_pages: u32 },
    #[error("fetch did not finish within {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

/// Safety bounds for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_pages: u32,
    pub timeout: Option<Duration>,
}

impl FetchLimits {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            timeout: config.fetch_timeout(),
        }
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_pages: crate::config::defaults::MAX_PAGES,
            timeout: None,
        }
    }
}

/// Drives a [`DeviceCloud`] through all pages of a query.
#[derive(Clone)]
pub struct LogFetcher {
    cloud: Arc<dyn DeviceCloud>,
    limits: FetchLimits,
}

impl LogFetcher {
    pub fn new(cloud: Arc<dyn DeviceCloud>, limits: FetchLimits) -> Self {
        Self { cloud, limits }
    }

    pub fn limits(&self) -> FetchLimits {
        self.limits
    }

    /// Retrieve every entry matching `query`, in page order.
    pub async fn fetch_all(&self, query: &LogQuery) -> Result<Vec<LogEntry>, FetchError> {
        match self.limits.timeout {
            Some(limit) => tokio::time::timeout(limit, self.paginate(query))
                .await
                .map_err(|_| {
                    warn!(device = %query.device_id, after = ?limit, "Log fetch timed out, discarding partial results");
                    FetchError::Timeout { after: limit }
                })?,
            None => self.paginate(query).await,
        }
    }

    async fn paginate(&self, query: &LogQuery) -> Result<Vec<LogEntry>, FetchError> {
        let mut cursor = String::new();
        let mut accumulated: Vec<LogEntry> = Vec::new();

        for page in 1..=self.limits.max_pages {
            let result = self
                .cloud
                .report_logs(query, &cursor)
                .await
                .map_err(|source| FetchError::UpstreamRequestFailed { page, source })?;

            debug!(
                source = self.cloud.source_name(),
                page,
                entries = result.entries.len(),
                has_more = result.has_more,
                "Fetched log page"
            );

            accumulated.extend(result.entries);

            if !result.has_more {
                info!(
                    device = %query.device_id,
                    pages = page,
                    entries = accumulated.len(),
                    "Log fetch complete"
                );
                return Ok(accumulated);
            }

            if result.next_cursor.is_empty() {
                return Err(FetchError::UpstreamRequestFailed {
                    page,
                    source: CloudError::Protocol(
                        "page reported more data but returned no cursor".to_string(),
                    ),
                });
            }
            cursor = result.next_cursor;
        }

        error!(
            device = %query.device_id,
            max_pages = self.limits.max_pages,
            "Pagination safety bound reached; upstream never reported the last page"
        );
        Err(FetchError::PaginationExceeded {
            max_pages: self.limits.max_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogPage, StatusReading, TimeRange};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves pre-scripted pages and records every cursor it receives.
    struct ScriptedCloud {
        pages: Vec<Result<LogPage, String>>,
        cursors: Mutex<Vec<String>>,
        endless: bool,
    }

    impl ScriptedCloud {
        fn new(pages: Vec<Result<LogPage, String>>) -> Self {
            Self {
                pages,
                cursors: Mutex::new(Vec::new()),
                endless: false,
            }
        }

        fn endless() -> Self {
            Self {
                pages: Vec::new(),
                cursors: Mutex::new(Vec::new()),
                endless: true,
            }
        }

        fn requests(&self) -> Vec<String> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeviceCloud for ScriptedCloud {
        async fn report_logs(&self, _q: &LogQuery, cursor: &str) -> Result<LogPage, CloudError> {
            let mut cursors = self.cursors.lock().unwrap();
            cursors.push(cursor.to_string());
            if self.endless {
                return Ok(LogPage {
                    entries: vec![LogEntry::new("t", 0, 1.0)],
                    next_cursor: "same".into(),
                    has_more: true,
                });
            }
            match &self.pages[cursors.len() - 1] {
                Ok(page) => Ok(page.clone()),
                Err(msg) => Err(CloudError::Protocol(msg.clone())),
            }
        }

        async fn device_status(&self, _d: &str) -> Result<Vec<StatusReading>, CloudError> {
            Ok(Vec::new())
        }

        fn source_name(&self) -> &str {
            "scripted"
        }
    }

    fn page(entries: Vec<LogEntry>, cursor: &str, has_more: bool) -> Result<LogPage, String> {
        Ok(LogPage {
            entries,
            next_cursor: cursor.into(),
            has_more,
        })
    }

    fn query() -> LogQuery {
        LogQuery {
            device_id: "dev-1".into(),
            codes: vec!["t".into(), "h".into()],
            range: TimeRange::new(0, 100),
            page_size: 2,
        }
    }

    fn limits(max_pages: u32) -> FetchLimits {
        FetchLimits {
            max_pages,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_three_pages_three_requests() {
        let cloud = Arc::new(ScriptedCloud::new(vec![
            page(vec![LogEntry::new("t", 1, 20.0), LogEntry::new("h", 1, 50.0)], "k1", true),
            page(vec![LogEntry::new("t", 2, 21.0), LogEntry::new("h", 2, 51.0)], "k2", true),
            page(vec![LogEntry::new("t", 3, 22.0)], "", false),
        ]));
        let fetcher = LogFetcher::new(cloud.clone(), limits(10));

        let entries = fetcher.fetch_all(&query()).await.unwrap();

        assert_eq!(cloud.requests(), vec!["", "k1", "k2"]);
        assert_eq!(entries.len(), 5);
        let temps: Vec<f64> = entries.iter().filter(|e| e.code == "t").map(|e| e.value).collect();
        assert_eq!(temps, vec![20.0, 21.0, 22.0]);
    }

    #[tokio::test]
    async fn test_failing_page_discards_everything() {
        let cloud = Arc::new(ScriptedCloud::new(vec![
            page(vec![LogEntry::new("t", 1, 20.0)], "k1", true),
            Err("boom".into()),
        ]));
        let fetcher = LogFetcher::new(cloud, limits(10));

        let err = fetcher.fetch_all(&query()).await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamRequestFailed { page: 2, .. }));
    }

    #[tokio::test]
    async fn test_endless_cursor_hits_bound() {
        let cloud = Arc::new(ScriptedCloud::endless());
        let fetcher = LogFetcher::new(cloud.clone(), limits(7));

        let err = fetcher.fetch_all(&query()).await.unwrap_err();
        assert!(matches!(err, FetchError::PaginationExceeded { max_pages: 7 }));
        assert_eq!(cloud.requests().len(), 7);
    }

    #[tokio::test]
    async fn test_missing_cursor_with_more_data_is_rejected() {
        let cloud = Arc::new(ScriptedCloud::new(vec![page(
            vec![LogEntry::new("t", 1, 20.0)],
            "",
            true,
        )]));
        let err = LogFetcher::new(cloud, limits(10))
            .fetch_all(&query())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::UpstreamRequestFailed {
                source: CloudError::Protocol(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_single_page() {
        let cloud = Arc::new(ScriptedCloud::new(vec![page(Vec::new(), "", false)]));
        let entries = LogFetcher::new(cloud, limits(1))
            .fetch_all(&query())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}
