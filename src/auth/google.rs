use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPES: &str = "openid email profile";

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    /// Missing means unverified.
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoogleOAuthClient: Send + Sync {
    fn authorize_url(&self, state: Option<String>, redirect_uri: Option<String>) -> AppResult<String>;
    async fn fetch_profile(&self, code: &str, redirect_uri: Option<String>) -> AppResult<GoogleProfile>;
}

pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    default_redirect_uri: String,
}

impl GoogleOAuth {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            default_redirect_uri: config.google_redirect_uri.clone(),
        }
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<String> {
        let response = self
            .http
            .post(TOKEN_URL)
            .header("accept", "application/json")
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send request to Google: {}", e);
                AppError::ExternalServiceError(format!("Failed to exchange OAuth code: {}", e))
            })?;

        let status = response.status();
        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse token response: {}", e))
        })?;

        if let Some(error) = token.error {
            let description = token
                .error_description
                .unwrap_or_else(|| "Unknown error".to_string());
            log::error!("Google OAuth error ({}): {} - {}", status, error, description);
            return Err(AppError::ExternalServiceError(format!(
                "Google OAuth error: {} - {}",
                error, description
            )));
        }

        token.access_token.ok_or_else(|| {
            AppError::ExternalServiceError("No access_token in Google response".to_string())
        })
    }
}

#[async_trait]
impl GoogleOAuthClient for GoogleOAuth {
    fn authorize_url(&self, state: Option<String>, redirect_uri: Option<String>) -> AppResult<String> {
        let redirect_uri = redirect_uri.unwrap_or_else(|| self.default_redirect_uri.clone());
        let mut params: Vec<(&str, String)> = vec![
            ("client_id", self.client_id.clone()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code".to_string()),
            ("scope", SCOPES.to_string()),
            ("prompt", "select_account".to_string()),
            ("access_type", "offline".to_string()),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }

        let url = reqwest::Url::parse_with_params(AUTHORIZE_URL, &params)
            .map_err(|e| AppError::InternalError(format!("Failed to build Google URL: {}", e)))?;
        Ok(url.to_string())
    }

    async fn fetch_profile(&self, code: &str, redirect_uri: Option<String>) -> AppResult<GoogleProfile> {
        let redirect_uri = redirect_uri.unwrap_or_else(|| self.default_redirect_uri.clone());
        let access_token = self.exchange_code(code, &redirect_uri).await?;

        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Failed to fetch Google user: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Google userinfo returned {}",
                response.status()
            )));
        }

        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Invalid Google profile: {}", e)))
    }
}
