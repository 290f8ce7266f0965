//! Recommendation text generators

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::types::RecommendationContext;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generator returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("generator returned an empty message")]
    EmptyResponse,
    #[error("generator unavailable: {0}")]
    Unavailable(String),
}

/// Produces advice text for a user's current climate.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    async fn generate(&self, context: &RecommendationContext) -> Result<String, GeneratorError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

#[derive(Deserialize)]
struct GeneratorReply {
    message: String,
}

/// POSTs the context as JSON and reads `{ "message": "..." }` back.
pub struct HttpGenerator {
    http: reqwest::Client,
    url: String,
}

impl HttpGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GeneratorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecommendationGenerator for HttpGenerator {
    async fn generate(&self, context: &RecommendationContext) -> Result<String, GeneratorError> {
        let resp = self.http.post(&self.url).json(context).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GeneratorError::ServerError(status));
        }

        let reply: GeneratorReply = resp.json().await?;
        debug!(user = %context.user_id, chars = reply.message.len(), "Generator replied");
        Ok(reply.message)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
