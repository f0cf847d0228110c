use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{
        parse::parse_quiz_questions, prompt::build_text_prompt, ProviderError, ProviderResult,
        QuizProvider,
    },
};

const COHERE_MODEL: &str = "command";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Text-only provider. Cohere cannot see the image, so it is prompted for
/// generic image questions.
pub struct CohereProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl CohereProvider {
    pub fn new(api_key: Option<SecretString>, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Returned when the generated text holds no usable question array.
pub fn canned_question() -> QuizQuestion {
    QuizQuestion::new(
        "What type of visual content is this?",
        ["Photograph", "Digital art", "Illustration", "Screenshot"],
        0,
        "Generated by Cohere AI",
    )
}

#[async_trait]
impl QuizProvider for CohereProvider {
    fn name(&self) -> &'static str {
        "cohere"
    }

    fn display_name(&self) -> &'static str {
        "Cohere (Free Tier)"
    }

    fn is_free(&self) -> bool {
        true
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn is_local(&self) -> bool {
        false
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_quiz_from_image(
        &self,
        _image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey("Cohere".to_string()))?;

        let body = GenerateRequest {
            model: COHERE_MODEL,
            prompt: build_text_prompt(options),
            max_tokens: 1000,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ProviderError::from_api_message("cohere", message));
        }

        let data: GenerateResponse = response.json().await?;
        let text = data
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| ProviderError::Api("Cohere returned no generations".to_string()))?;

        Ok(questions_from_generation(&text, options.num_questions))
    }
}

/// Parsed questions capped at the requested count, or the canned question
/// when the text holds no valid array.
fn questions_from_generation(text: &str, num_questions: usize) -> Vec<QuizQuestion> {
    match parse_quiz_questions(text) {
        Ok(mut questions) => {
            questions.truncate(num_questions);
            questions
        }
        Err(e) => {
            log::warn!("Cohere: could not parse generated questions ({}), using canned question", e);
            vec![canned_question()]
        }
    }
}
