//! Offline device cloud backed by a JSON log dump.
//!
//! The dump is a JSON array of raw log rows (`[{code, event_time, value}]`),
//! the format the `simulation` binary writes. Pages are served with the same
//! cursor protocol as the live API so the fetcher runs unchanged.

use async_trait::async_trait;
use std::path::Path;

use super::wire::{RawLog, ValueScaling};
use super::{CloudError, DeviceCloud};
use crate::types::{LogPage, LogQuery, StatusReading};

/// Replays pre-loaded raw logs.
pub struct FileSource {
    logs: Vec<RawLog>,
    scaling: ValueScaling,
}

impl FileSource {
    pub fn new(logs: Vec<RawLog>, scaling: ValueScaling) -> Self {
        Self { logs, scaling }
    }

    /// Load a dump from disk.
    pub fn open<P: AsRef<Path>>(path: P, scaling: ValueScaling) -> Result<Self, CloudError> {
        let bytes = std::fs::read(path.as_ref())?;
        let logs: Vec<RawLog> =
            serde_json::from_slice(&bytes).map_err(|e| CloudError::Decode(e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), rows = logs.len(), "Loaded log dump");
        Ok(Self::new(logs, scaling))
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

#[async_trait]
impl DeviceCloud for FileSource {
    async fn report_logs(&self, query: &LogQuery, cursor: &str) -> Result<LogPage, CloudError> {
        let offset = if cursor.is_empty() {
            0
        } else {
            cursor
                .parse::<usize>()
                .map_err(|_| CloudError::Protocol(format!("invalid cursor '{cursor}'")))?
        };

        let matching: Vec<&RawLog> = self
            .logs
            .iter()
            .filter(|l| query.codes.iter().any(|c| c == &l.code))
            .filter(|l| query.range.contains(l.event_time))
            .collect();

        let page_size = query.page_size.max(1) as usize;
        let end = (offset + page_size).min(matching.len());
        let rows = matching.get(offset..end).unwrap_or_default();
        let has_more = end < matching.len();

        Ok(LogPage {
            entries: rows.iter().filter_map(|l| self.scaling.log_entry(l)).collect(),
            next_cursor: if has_more { end.to_string() } else { String::new() },
            has_more,
        })
    }

    async fn device_status(&self, _device_id: &str) -> Result<Vec<StatusReading>, CloudError> {
        let mut latest: Vec<&RawLog> = Vec::new();
        for log in &self.logs {
            match latest.iter_mut().find(|l| l.code == log.code) {
                Some(slot) if slot.event_time <= log.event_time => *slot = log,
                Some(_) => {}
                None => latest.push(log),
            }
        }

        Ok(latest
            .into_iter()
            .filter_map(|l| self.scaling.log_entry(l))
            .map(|e| StatusReading {
                code: e.code,
                value: e.value,
            })
            .collect())
    }

    fn source_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeRange;
    use serde_json::json;

    fn dump() -> FileSource {
        let logs = (0..5)
            .flat_map(|i| {
                [
                    RawLog {
                        code: "va_temperature".into(),
                        event_time: i * 1000,
                        value: json!((200 + i).to_string()),
                    },
                    RawLog {
                        code: "va_humidity".into(),
                        event_time: i * 1000,
                        value: json!(50 + i),
                    },
                ]
            })
            .collect();
        FileSource::new(
            logs,
            ValueScaling::new([("va_temperature".to_string(), 10.0)].into()),
        )
    }

    fn query(codes: &[&str], page_size: u32) -> LogQuery {
        LogQuery {
            device_id: "dev".into(),
            codes: codes.iter().map(|c| (*c).to_string()).collect(),
            range: TimeRange::new(0, 10_000),
            page_size,
        }
    }

    #[tokio::test]
    async fn test_pages_follow_cursor() {
        let source = dump();
        let q = query(&["va_temperature"], 2);
        let first = source.report_logs(&q, "").await.unwrap();
        assert_eq!(first.entries.len(), 2);
        assert!(first.has_more);
        let second = source.report_logs(&q, &first.next_cursor).await.unwrap();
        let third = source.report_logs(&q, &second.next_cursor).await.unwrap();
        assert_eq!(third.entries.len(), 1);
        assert!(!third.has_more);
    }

    #[tokio::test]
    async fn test_bad_cursor_is_protocol_error() {
        let err = dump()
            .report_logs(&query(&["va_humidity"], 2), "zz")
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_status_uses_latest_row_per_code() {
        let status = dump().device_status("dev").await.unwrap();
        let temp = status.iter().find(|s| s.code == "va_temperature").unwrap();
        assert_eq!(temp.value, 20.4);
        let hum = status.iter().find(|s| s.code == "va_humidity").unwrap();
        assert_eq!(hum.value, 54.0);
    }
}
