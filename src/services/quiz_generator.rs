//! Multi-provider question generation with fallback.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AiConfig,
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{
        fallback::fallback_questions, CohereProvider, GeminiProvider, HuggingFaceProvider,
        ImageFetcher, OllamaProvider, OpenAiProvider, ProviderInfo, QuizProvider,
        ReqwestImageFetcher,
    },
};

pub const DEFAULT_PROVIDER: &str = "huggingface";

/// Questions plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub questions: Vec<QuizQuestion>,
    /// `None` when the fixed fallback set was used.
    pub provider: Option<String>,
    pub used_fallback: bool,
}

pub struct QuizGenerator {
    providers: Vec<Arc<dyn QuizProvider>>,
    current_provider: RwLock<String>,
    fallback_order: Vec<String>,
}

impl QuizGenerator {
    pub fn new(
        providers: Vec<Arc<dyn QuizProvider>>,
        current_provider: &str,
        fallback_order: Vec<String>,
    ) -> Self {
        let current = if providers.iter().any(|p| p.name() == current_provider) {
            current_provider.to_string()
        } else {
            log::warn!(
                "Unknown default provider '{}', using {}",
                current_provider,
                DEFAULT_PROVIDER
            );
            DEFAULT_PROVIDER.to_string()
        };

        Self {
            providers,
            current_provider: RwLock::new(current),
            fallback_order,
        }
    }

    /// Registers every built-in provider in listing order.
    pub fn from_config(config: &AiConfig) -> Self {
        let images: Arc<dyn ImageFetcher> =
            Arc::new(ReqwestImageFetcher::new(config.request_timeout_secs));

        let providers: Vec<Arc<dyn QuizProvider>> = vec![
            Arc::new(HuggingFaceProvider::new()),
            Arc::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
            )),
            Arc::new(GeminiProvider::new(
                config.gemini_api_key.clone(),
                config.gemini_base_url.clone(),
                config.gemini_model.clone(),
                config.request_timeout_secs,
                images.clone(),
            )),
            Arc::new(OllamaProvider::new(
                config.ollama_base_url.clone(),
                config.ollama_model.clone(),
                config.request_timeout_secs,
                images,
            )),
            Arc::new(CohereProvider::new(
                config.cohere_api_key.clone(),
                config.cohere_base_url.clone(),
                config.request_timeout_secs,
            )),
        ];

        Self::new(
            providers,
            &config.default_provider,
            config.fallback_providers.clone(),
        )
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn QuizProvider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub async fn current_provider(&self) -> String {
        self.current_provider.read().await.clone()
    }

    /// Switch the preferred provider. Returns false for unknown names.
    pub async fn set_provider(&self, name: &str) -> bool {
        if !self.is_known(name) {
            return false;
        }
        *self.current_provider.write().await = name.to_string();
        log::info!("Preferred quiz provider set to {}", name);
        true
    }

    pub async fn available_providers(&self) -> Vec<ProviderInfo> {
        let mut infos = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            infos.push(ProviderInfo::describe(provider.as_ref()).await);
        }
        infos
    }

    async fn try_order(&self, preferred: Option<&str>) -> Vec<String> {
        let first = match preferred {
            Some(name) => name.to_string(),
            None => self.current_provider().await,
        };

        let mut order: Vec<String> = Vec::with_capacity(self.fallback_order.len() + 1);
        for name in std::iter::once(&first).chain(self.fallback_order.iter()) {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }
        order
    }

    /// Walk the providers in preference order and return the first non-empty
    /// question list. Never fails: the fixed set is returned as a last resort.
    pub async fn generate_quiz_from_image(
        &self,
        image_url: &str,
        options: &GenerationOptions,
        preferred: Option<&str>,
    ) -> GenerationOutcome {
        for name in self.try_order(preferred).await {
            let Some(provider) = self.find(&name) else {
                log::warn!("Unknown provider '{}' in try order, skipping", name);
                continue;
            };

            if !provider.is_available().await {
                log::info!("Provider {} not available, trying next...", name);
                continue;
            }

            log::info!("Trying to generate quiz with {}...", name);
            match provider.generate_quiz_from_image(image_url, options).await {
                Ok(questions) if !questions.is_empty() => {
                    log::info!("Successfully generated quiz with {}", name);
                    return GenerationOutcome {
                        questions,
                        provider: Some(name),
                        used_fallback: false,
                    };
                }
                Ok(_) => log::warn!("Provider {} returned no questions", name),
                Err(e) if e.is_quota_or_billing() => {
                    log::warn!("Provider {} failed: {}", name, e)
                }
                Err(e) => log::error!("Provider {} error: {}", name, e),
            }
        }

        log::warn!("All AI providers failed, returning fallback questions");
        GenerationOutcome {
            questions: fallback_questions(),
            provider: None,
            used_fallback: true,
        }
    }
}
