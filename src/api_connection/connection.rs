use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{InconsistentCounts, SuggestionRequest, SuggestionResponse, SUGGEST_PATH};

const USER_AGENT: &str = concat!("recipe-suggest/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid suggestion response: {0}")]
    InvalidResponse(#[from] InconsistentCounts),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err)
        } else {
            ServiceError::NetworkError(err)
        }
    }
}

/// The remote recipe suggestion service.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ServiceError>;
}

/// `SuggestionService` over HTTP: `POST {base_url}/api/suggest` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpSuggestionClient {
    client: Client,
    endpoint: String,
}

impl HttpSuggestionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUGGEST_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SuggestionService for HttpSuggestionClient {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ServiceError> {
        debug!(endpoint = %self.endpoint, ingredients = ?request.ingredients, "sending suggestion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ServiceError::ApiError { status, error_body });
        }

        let body = response.text().await?;
        let parsed: SuggestionResponse = serde_json::from_str(&body)?;
        parsed.validate()?;
        debug!(suggestions = parsed.suggestions.len(), "suggestion response parsed");
        Ok(parsed)
    }
}
