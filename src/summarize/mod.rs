pub mod models;
pub mod remote;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

use crate::summarize::models::{Dialect, SummaryResponse};

/// Message recorded for every non-2xx answer from the summarization service.
pub const BAD_STATUS_MESSAGE: &str = "Network response was not ok";

#[derive(Debug)]
pub enum SummarizeError {
    /// The request never produced an HTTP response.
    ConnectionError(String),
    /// The service answered with a non-success status; the body is discarded.
    StatusError(u16),
    /// A 2xx answer whose body was not JSON.
    ResponseError(String),
    /// The call ended without producing an outcome.
    Aborted(String),
    ConfigError(String),
}

impl fmt::Display for SummarizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummarizeError::ConnectionError(msg) => write!(f, "Failed to fetch: {}", msg),
            SummarizeError::StatusError(_) => f.write_str(BAD_STATUS_MESSAGE),
            SummarizeError::ResponseError(msg) => write!(f, "Invalid response body: {}", msg),
            SummarizeError::Aborted(msg) => write!(f, "Request aborted: {}", msg),
            SummarizeError::ConfigError(msg) => write!(f, "Summarizer configuration error: {}", msg),
        }
    }
}

impl Error for SummarizeError {}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        question: &str,
        dialect: Dialect,
    ) -> Result<SummaryResponse, SummarizeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_hide_the_code() {
        assert_eq!(
            SummarizeError::StatusError(500).to_string(),
            "Network response was not ok"
        );
        assert_eq!(
            SummarizeError::StatusError(404).to_string(),
            SummarizeError::StatusError(503).to_string()
        );
    }
}
