//! Telemetry Coordinator - report and status flows over a [`DeviceCloud`]
//!
//! ```text
//! report:  fetch all pages -> partition by code -> window summaries
//!          -> (optional) merged points + derived VPD / dew point
//! status:  device status  ─┐
//!                          ├─> latest reading + derived climate + 24h window
//!          24h log window ─┘
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::acquisition::{CloudError, DeviceCloud, FetchError, FetchLimits, LogFetcher};
use crate::config::defaults::STATUS_WINDOW_HOURS;
use crate::config::TelemetryConfig;
use crate::processing::{
    assemble_snapshot, derive_points, merge_points, partition_by_code, summarize,
    summarize_all, unique_codes, LatestReading,
};
use crate::types::{
    AggregateSummary, LogQuery, MetricSeries, StatusSnapshot, TelemetryReport, TimeRange,
};

/// Failure of a status request.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("window fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("device status request failed: {0}")]
    Status(#[source] CloudError),
}

/// Parameters of a historical report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub device_id: String,
    /// Empty means the configured temperature and humidity codes
    pub codes: Vec<String>,
    pub range: TimeRange,
    /// Attach merged points and derived values to the report
    pub include_points: bool,
}

pub struct TelemetryCoordinator {
    cloud: Arc<dyn DeviceCloud>,
    fetcher: LogFetcher,
    config: TelemetryConfig,
}

impl TelemetryCoordinator {
    pub fn new(cloud: Arc<dyn DeviceCloud>, config: TelemetryConfig) -> Self {
        let fetcher = LogFetcher::new(Arc::clone(&cloud), FetchLimits::from_config(&config));
        Self {
            cloud,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Summaries (and optionally aligned points) for a device over a range.
    pub async fn report(&self, request: &ReportRequest) -> Result<TelemetryReport, FetchError> {
        let codes = if request.codes.is_empty() {
            self.config.climate_codes()
        } else {
            unique_codes(&request.codes)
        };
        if request.range.is_empty() {
            warn!(
                device = %request.device_id,
                start = request.range.start_ms,
                end = request.range.end_ms,
                "Report range is empty"
            );
        }

        let query = LogQuery {
            device_id: request.device_id.clone(),
            codes: codes.clone(),
            range: request.range,
            page_size: self.config.page_size,
        };
        let entries = self.fetcher.fetch_all(&query).await?;
        let series = partition_by_code(&entries, &codes);
        let summaries = summarize_all(&series);

        let (points, derived) = if request.include_points {
            let points = merge_points(&series);
            let derived = derive_points(
                &points,
                &self.config.temperature_code,
                &self.config.humidity_code,
            );
            (Some(points), Some(derived))
        } else {
            (None, None)
        };

        info!(
            device = %request.device_id,
            entries = entries.len(),
            codes = codes.len(),
            "Telemetry report assembled"
        );

        Ok(TelemetryReport {
            device_id: request.device_id.clone(),
            range: request.range,
            codes,
            total_entries: entries.len(),
            summaries,
            points,
            derived,
        })
    }

    /// Current reading plus the trailing 24h window.
    ///
    /// Either upstream call failing fails the whole snapshot.
    pub async fn status(
        &self,
        device_id: &str,
        now_ms: i64,
    ) -> Result<StatusSnapshot, TelemetryError> {
        let codes = self.config.climate_codes();
        let query = LogQuery {
            device_id: device_id.to_string(),
            codes: codes.clone(),
            range: TimeRange::new(now_ms - STATUS_WINDOW_HOURS * 3_600_000, now_ms),
            page_size: self.config.page_size,
        };

        let (readings, entries) = tokio::try_join!(
            async {
                self.cloud
                    .device_status(device_id)
                    .await
                    .map_err(TelemetryError::Status)
            },
            async { self.fetcher.fetch_all(&query).await.map_err(TelemetryError::from) },
        )?;

        let reading = LatestReading::from_status(
            &readings,
            &self.config.temperature_code,
            &self.config.humidity_code,
        );
        debug!(device = device_id, ?reading, "Latest status reading");

        let series = partition_by_code(&entries, &codes);
        let window = |code: &str| -> AggregateSummary {
            series
                .iter()
                .find(|s| s.code() == code)
                .map(summarize)
                .unwrap_or_else(|| summarize(&MetricSeries::new(code, Vec::new())))
        };

        Ok(assemble_snapshot(
            reading,
            window(&self.config.temperature_code),
            window(&self.config.humidity_code),
        ))
    }
}
