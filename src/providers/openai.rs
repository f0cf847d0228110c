use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    models::domain::{GenerationOptions, QuizQuestion},
    providers::{
        parse::parse_quiz_questions, prompt::build_quiz_prompt, ProviderError, ProviderResult,
        QuizProvider,
    },
};

/// Vision chat completion. The image URL is passed through for the API to fetch.
pub struct OpenAiProvider {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        let client = api_key.map(|key| {
            let config = OpenAIConfig::new().with_api_key(key.expose_secret());
            Client::with_config(config)
        });

        Self {
            client,
            model: model.into(),
        }
    }

    fn build_request_messages(
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<ChatCompletionRequestMessage>> {
        let parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: build_quiz_prompt(options),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image_url.to_string(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        Ok(vec![ChatCompletionRequestMessage::User(user_message)])
    }
}

#[async_trait]
impl QuizProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI (Free Trial)"
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
        self.client.is_some()
    }

    async fn generate_quiz_from_image(
        &self,
        image_url: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey("OpenAI".to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::build_request_messages(image_url, options)?)
            .temperature(0.7)
            .max_tokens(1500u32)
            .build()
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        log::debug!("OpenAI: requesting {} questions from {}", options.num_questions, self.model);

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| ProviderError::from_api_message("openai", e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::Api("OpenAI returned an empty response".to_string()))?;

        parse_quiz_questions(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_missing_key_is_unavailable() {
        let provider = OpenAiProvider::new(None, "gpt-4o-mini");
        assert!(!provider.is_available().await);

        let err = provider
            .generate_quiz_from_image("https://example.com/a.jpg", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(_)));
    }

    #[test]
    fn test_request_carries_prompt_and_image() {
        let messages = OpenAiProvider::build_request_messages(
            "https://example.com/a.jpg",
            &GenerationOptions::default(),
        )
        .unwrap();

        assert_eq!(messages.len(), 1);
        let json = serde_json::to_string(&messages[0]).unwrap();
        assert!(json.contains("https://example.com/a.jpg"));
        assert!(json.contains("generate 5 quiz questions"));
    }
}
