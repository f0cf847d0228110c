use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{
        image::ImageFetcher, parse::parse_quiz_questions, prompt::build_quiz_prompt,
        ProviderError, ProviderResult, QuizProvider,
    },
};

const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    images: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Locally hosted vision model.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    images: Arc<dyn ImageFetcher>,
}

impl OllamaProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        images: Arc<dyn ImageFetcher>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            images,
        }
    }
}

#[async_trait]
impl QuizProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn display_name(&self) -> &'static str {
        "Ollama (Local & Free)"
    }

    fn is_free(&self) -> bool {
        true
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    fn is_local(&self) -> bool {
        true
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/tags", self.base_url))
            .timeout(AVAILABILITY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::debug!("Ollama is not reachable at {}: {}", self.base_url, e);
                false
            }
        }
    }

    async fn generate_quiz_from_image(
        &self,
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        let image = self.images.fetch_base64(image_url).await?;
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_quiz_prompt(options),
            images: vec![image.base64_data],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "Ollama returned {}",
                response.status()
            )));
        }

        let data: GenerateResponse = response.json().await?;
        parse_quiz_questions(&data.response)
    }
}
