//! Cloud Client - HTTP client for the device-cloud OpenAPI
//!
//! Handles report-log pages and device status reads.

use async_trait::async_trait;
use tracing::debug;

use super::wire::{ApiEnvelope, RawLogPage, RawStatus, ValueScaling};
use super::{CloudError, DeviceCloud};
use crate::config::DeviceCloudConfig;
use crate::types::{LogPage, LogQuery, StatusReading};

/// HTTP client for device-cloud communication
#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    access_token: String,
    scaling: ValueScaling,
}

impl CloudClient {
    /// Create a new client from config
    pub fn new(config: &DeviceCloudConfig, scaling: ValueScaling) -> Result<Self, CloudError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
            scaling,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("client_id", &self.client_id)
            .header("access_token", &self.access_token)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, CloudError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(CloudError::ServerError(status));
        }

        let body = resp.bytes().await?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_slice(&body).map_err(|e| CloudError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(CloudError::Api {
                code: envelope
                    .code
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                message: envelope.msg.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| CloudError::Decode("success response without result".to_string()))
    }

    /// Get base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DeviceCloud for CloudClient {
    async fn report_logs(&self, query: &LogQuery, cursor: &str) -> Result<LogPage, CloudError> {
        let size = query.page_size.to_string();
        let start = query.range.start_ms.to_string();
        let end = query.range.end_ms.to_string();
        let codes = query.codes.join(",");

        let resp = self
            .get(&format!(
                "/v2.0/cloud/thing/{}/report-logs",
                query.device_id
            ))
            .query(&[
                ("codes", codes.as_str()),
                ("start_time", start.as_str()),
                ("end_time", end.as_str()),
                ("size", size.as_str()),
                ("last_row_key", cursor),
            ])
            .send()
            .await?;

        let raw: RawLogPage = Self::decode(resp).await?;
        debug!(
            device = %query.device_id,
            rows = raw.logs.len(),
            has_more = raw.has_more,
            "Report-logs page received"
        );
        Ok(self.scaling.page(raw))
    }

    async fn device_status(&self, device_id: &str) -> Result<Vec<StatusReading>, CloudError> {
        let resp = self
            .get(&format!("/v1.0/iot-03/devices/{device_id}/status"))
            .send()
            .await?;

        let raw: Vec<RawStatus> = Self::decode(resp).await?;
        Ok(raw
            .iter()
            .filter_map(|s| self.scaling.status_reading(s))
            .collect())
    }

    fn source_name(&self) -> &str {
        "device-cloud"
    }
}
