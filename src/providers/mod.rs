//! Question providers.
//!
//! Every provider turns an image URL into a list of four-option questions.
//! Providers carry static metadata (free, key required, local) and an
//! availability probe; the generator walks them in order and falls back to a
//! fixed question set when all of them fail.

pub mod cohere;
pub mod fallback;
pub mod gemini;
pub mod huggingface;
pub mod image;
pub mod ollama;
pub mod openai;
pub mod parse;
pub mod prompt;

use async_graphql::SimpleObject;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::domain::{GenerationOptions, QuizQuestion};

pub use cohere::CohereProvider;
pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use image::{ImageFetcher, ReqwestImageFetcher};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not available")]
    Unavailable(String),

    #[error("{0} API key is not configured")]
    MissingApiKey(String),

    #[error("{0} quota exceeded: {1}")]
    Quota(String, String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Could not parse quiz questions: {0}")]
    Parse(String),

    #[error("Failed to process image: {0}")]
    Image(String),
}

impl ProviderError {
    /// Quota and billing failures are expected on free tiers and only warrant a warning.
    pub fn is_quota_or_billing(&self) -> bool {
        match self {
            ProviderError::Quota(..) => true,
            other => {
                let message = other.to_string().to_lowercase();
                message.contains("quota") || message.contains("billing")
            }
        }
    }

    /// Classify an API error message returned by a provider.
    pub fn from_api_message(provider: &str, message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("quota") || lower.contains("billing") {
            ProviderError::Quota(provider.to_string(), message)
        } else {
            ProviderError::Api(message)
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// Stable key used in configuration and requests.
    fn name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    fn is_free(&self) -> bool;
    fn requires_api_key(&self) -> bool;
    fn is_local(&self) -> bool;

    async fn is_available(&self) -> bool;

    async fn generate_quiz_from_image(
        &self,
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>>;
}

/// Static metadata plus current availability of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct ProviderInfo {
    pub name: String,
    pub display_name: String,
    pub is_free: bool,
    pub requires_api_key: bool,
    pub is_local: bool,
    pub available: bool,
}

impl ProviderInfo {
    pub async fn describe(provider: &dyn QuizProvider) -> Self {
        ProviderInfo {
            name: provider.name().to_string(),
            display_name: provider.display_name().to_string(),
            is_free: provider.is_free(),
            requires_api_key: provider.requires_api_key(),
            is_local: provider.is_local(),
            available: provider.is_available().await,
        }
    }
}
