use secrecy::SecretString;
use std::env;

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_GOOGLE_CLIENT_ID: &str = "google_client_id";
const DEFAULT_GOOGLE_CLIENT_SECRET: &str = "google_client_secret";

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub jwt_refresh_expiration_hours: i64,
    pub google_client_id: String,
    pub google_client_secret: SecretString,
    pub google_redirect_uri: String,
    pub ai: AiConfig,
}

/// Settings for the quiz question providers.
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub default_provider: String,
    pub fallback_providers: Vec<String>,
    pub request_timeout_secs: u64,
    pub gemini_api_key: Option<SecretString>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub cohere_api_key: Option<SecretString>,
    pub cohere_base_url: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
}

fn optional_secret(key: &str) -> Option<SecretString> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn parse_provider_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            default_provider: env::var("AI_DEFAULT_PROVIDER")
                .map(|p| p.trim().to_lowercase())
                .unwrap_or_else(|_| "huggingface".to_string()),
            fallback_providers: parse_provider_list(
                &env::var("AI_FALLBACK_PROVIDERS")
                    .unwrap_or_else(|_| "huggingface,cohere,openai,gemini".to_string()),
            ),
            request_timeout_secs: env::var("AI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            gemini_api_key: optional_secret("GEMINI_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
            openai_api_key: optional_secret("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            cohere_api_key: optional_secret("COHERE_API_KEY"),
            cohere_base_url: env::var("COHERE_BASE_URL")
                .unwrap_or_else(|_| "https://api.cohere.ai/v1".to_string()),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434/api".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llava".to_string()),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "snapquiz-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            jwt_refresh_expiration_hours: env::var("JWT_REFRESH_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(168),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_CLIENT_ID.to_string()),
            google_client_secret: SecretString::from(
                env::var("GOOGLE_CLIENT_SECRET")
                    .unwrap_or_else(|_| DEFAULT_GOOGLE_CLIENT_SECRET.to_string()),
            ),
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:5173/auth/callback".to_string()),
            ai: AiConfig::from_env(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();
        let google_secret = self.google_client_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if google_secret == DEFAULT_GOOGLE_CLIENT_SECRET {
            panic!(
                "FATAL: GOOGLE_CLIENT_SECRET is using default value! Set GOOGLE_CLIENT_SECRET environment variable."
            );
        }

        if self.google_client_id == DEFAULT_GOOGLE_CLIENT_ID {
            panic!(
                "FATAL: GOOGLE_CLIENT_ID is using default value! Set GOOGLE_CLIENT_ID environment variable."
            );
        }
    }

    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "snapquiz-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            jwt_refresh_expiration_hours: 168,
            google_client_id: "test-client-id".to_string(),
            google_client_secret: SecretString::from("test-client-secret".to_string()),
            google_redirect_uri: "http://localhost:5173/auth/callback".to_string(),
            ai: AiConfig {
                default_provider: "huggingface".to_string(),
                fallback_providers: parse_provider_list("huggingface,cohere,openai,gemini"),
                request_timeout_secs: 5,
                gemini_api_key: None,
                gemini_base_url: "http://127.0.0.1:9/v1beta".to_string(),
                gemini_model: "gemini-1.5-flash-latest".to_string(),
                openai_api_key: None,
                openai_model: "gpt-4o-mini".to_string(),
                cohere_api_key: None,
                cohere_base_url: "http://127.0.0.1:9/v1".to_string(),
                ollama_base_url: "http://127.0.0.1:9/api".to_string(),
                ollama_model: "llava".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.jwt_refresh_expiration_hours > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_conn_string, "mongodb://localhost:27017");
        assert_eq!(config.mongo_db_name, "snapquiz-test");
        assert_eq!(config.ai.default_provider, "huggingface");
        assert!(!config.is_production());
    }

    #[test]
    fn test_parse_provider_list_trims_and_lowercases() {
        let parsed = parse_provider_list(" HuggingFace, cohere ,,OpenAI ");
        assert_eq!(parsed, vec!["huggingface", "cohere", "openai"]);
    }

    #[test]
    #[should_panic(expected = "JWT_SECRET is using default value")]
    fn test_validate_for_production_rejects_default_secret() {
        let mut config = Config::test_config();
        config.jwt_secret = SecretString::from(DEFAULT_JWT_SECRET.to_string());
        config.validate_for_production();
    }

    #[test]
    #[should_panic(expected = "too short")]
    fn test_validate_for_production_rejects_short_secret() {
        let config = Config::test_config();
        config.validate_for_production();
    }
}
