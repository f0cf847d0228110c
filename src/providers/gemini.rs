use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{
        image::{ImageFetcher, InlineImage},
        parse::parse_quiz_questions,
        prompt::build_quiz_prompt,
        ProviderError, ProviderResult, QuizProvider,
    },
};

/// Tried in order before falling back to any vision, flash or pro model.
const PREFERRED_MODELS: &[&str] = &[
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash",
    "gemini-1.5-pro-latest",
    "gemini-1.5-pro",
    "gemini-pro-vision",
    "gemini-pro",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Image { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
            response_mime_type: "application/json",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    default_model: String,
    images: Arc<dyn ImageFetcher>,
}

impl GeminiProvider {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        timeout_secs: u64,
        images: Arc<dyn ImageFetcher>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
            images,
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string())
    }

    async fn list_models(&self, api_key: &SecretString) -> ProviderResult<Vec<ModelInfo>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", api_key.expose_secret())])
            .send()
            .await?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(ProviderError::from_api_message("gemini", message));
        }

        Ok(response.json::<ModelList>().await?.models)
    }

    /// Model to call. Uses the configured default when the model list cannot
    /// be fetched.
    async fn resolve_model(&self, api_key: &SecretString) -> ProviderResult<String> {
        match self.list_models(api_key).await {
            Ok(models) => find_best_image_model(&models).ok_or_else(|| {
                ProviderError::Api("No suitable model found for image processing".to_string())
            }),
            Err(e @ ProviderError::Quota(..)) => Err(e),
            Err(e) => {
                log::warn!(
                    "Gemini: could not list models ({}), using {}",
                    e,
                    self.default_model
                );
                Ok(self.default_model.clone())
            }
        }
    }

    fn build_request(prompt: String, image: InlineImage) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.base64_data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

/// First preferred model advertising `generateContent`, else any model whose
/// name mentions vision, flash or pro.
pub fn find_best_image_model(models: &[ModelInfo]) -> Option<String> {
    for preferred in PREFERRED_MODELS {
        let full_name = format!("models/{}", preferred);
        let supported = models.iter().any(|m| {
            m.name == full_name
                && m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
        });
        if supported {
            return Some((*preferred).to_string());
        }
    }

    models
        .iter()
        .find(|m| m.name.contains("vision") || m.name.contains("flash") || m.name.contains("pro"))
        .map(|m| m.name.trim_start_matches("models/").to_string())
}

#[async_trait]
impl QuizProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
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
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey("Gemini".to_string()))?;

        let model = self.resolve_model(api_key).await?;
        let image = self.images.fetch_base64(image_url).await?;
        let body = Self::build_request(build_quiz_prompt(options), image);

        log::debug!("Gemini: generating with model {}", model);

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(ProviderError::from_api_message("gemini", message));
        }

        let data: GenerateContentResponse = response.json().await?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ProviderError::Api("No quiz questions generated".to_string()))?;

        parse_quiz_questions(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::image::MockImageFetcher;

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_prefers_listed_models_in_order() {
        let models = vec![
            model("models/gemini-1.5-pro", &["generateContent"]),
            model("models/gemini-1.5-flash", &["generateContent"]),
        ];
        assert_eq!(find_best_image_model(&models).as_deref(), Some("gemini-1.5-flash"));
    }

    #[test]
    fn test_skips_preferred_model_without_generate_content() {
        let models = vec![
            model("models/gemini-1.5-flash-latest", &["embedContent"]),
            model("models/gemini-1.5-pro", &["generateContent"]),
        ];
        assert_eq!(find_best_image_model(&models).as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn test_falls_back_to_name_match() {
        let models = vec![
            model("models/text-embedding-004", &["embedContent"]),
            model("models/gemini-2.0-flash-exp", &[]),
        ];
        assert_eq!(
            find_best_image_model(&models).as_deref(),
            Some("gemini-2.0-flash-exp")
        );
        assert_eq!(find_best_image_model(&[model("models/embedding", &[])]), None);
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiProvider::build_request(
            "prompt".to_string(),
            InlineImage {
                mime_type: "image/png".to_string(),
                base64_data: "AAAA".to_string(),
            },
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[actix_web::test]
    async fn test_missing_key_skips_image_fetch() {
        let mut images = MockImageFetcher::new();
        images.expect_fetch_base64().never();

        let provider =
            GeminiProvider::new(None, "http://127.0.0.1:9/v1beta", "gemini-1.5-flash", 1, Arc::new(images));

        assert!(!provider.is_available().await);
        let err = provider
            .generate_quiz_from_image("https://example.com/a.jpg", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(_)));
    }
}
