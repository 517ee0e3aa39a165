use async_trait::async_trait;
use thiserror::Error;

use crate::clients::openai_client::{self, DEFAULT_MODEL, OPENAI_API_URL};

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("suggestion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("suggestion service returned status {0}")]
    Status(u16),
    #[error("could not decode suggestion response: {0}")]
    Decode(String),
    #[error("suggestion service returned no schedule")]
    EmptyResponse,
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("{0}")]
    Service(String),
}

/// Text in, schedule text out. The returned text is fed to the suggestion parser.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn suggest(&self, preferences: &str) -> Result<String, SuggestionError>;
}

pub struct OpenAIService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAIService {
    pub fn new(api_key: String) -> Result<Self, SuggestionError> {
        if api_key.trim().is_empty() {
            return Err(SuggestionError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: OPENAI_API_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SuggestionClient for OpenAIService {
    async fn suggest(&self, preferences: &str) -> Result<String, SuggestionError> {
        openai_client::request_schedule(
            &self.http,
            &self.api_url,
            &self.api_key,
            &self.model,
            preferences,
        )
        .await
    }
}
