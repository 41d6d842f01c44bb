use crate::config::SummarizerConfig;
use crate::summarize::models::{Dialect, SummarizeRequest, SummaryResponse};
use crate::summarize::{SummarizeError, Summarizer};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct RemoteSummarizer {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let endpoint = config.endpoint();
        reqwest::Url::parse(&endpoint).map_err(|e| {
            SummarizeError::ConfigError(format!("Invalid summarizer URL '{}': {}", endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizeError::ConnectionError(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(
        &self,
        question: &str,
        dialect: Dialect,
    ) -> Result<SummaryResponse, SummarizeError> {
        let request = SummarizeRequest {
            question: question.to_string(),
            db_type: dialect,
        };

        info!("Sending question to summarizer ({})", dialect);
        debug!("Summarize request to {}: {:?}", self.endpoint, request);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The body is discarded; callers only see the fixed message
            warn!("Summarizer responded with status code: {}", status);
            return Err(SummarizeError::StatusError(status.as_u16()));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| SummarizeError::ConnectionError(e.to_string()))?;

        debug!("Raw response from summarizer: {}", response_text);

        let value = serde_json::from_str(&response_text)
            .map_err(|e| SummarizeError::ResponseError(e.to_string()))?;

        Ok(SummaryResponse(value))
    }
}
