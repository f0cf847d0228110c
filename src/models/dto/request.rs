use async_graphql::InputObject;
use once_cell::sync::Lazy;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{
    quiz::{
        Difficulty, GenerationOptions, DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT, MAX_TIME_SPENT_SECS,
    },
    QuizQuestion,
};

static HTTP_URL_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("HTTP_URL_REGEX is a valid regex pattern")
});

fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if HTTP_URL_REGEX.is_match(url.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("http_url").with_message("Image URL must be an http(s) URL".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 6, message = "Password should be at least 6 characters long."))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleAuthorizeParams {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(custom(function = "validate_http_url"))]
    pub image_url: String,

    #[validate(range(min = 1, max = 10))]
    pub num_questions: Option<usize>,

    pub difficulty: Option<Difficulty>,

    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,

    /// Provider to try first for this request.
    pub provider: Option<String>,
}

impl GenerateQuizRequest {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            num_questions: self
                .num_questions
                .unwrap_or(DEFAULT_QUESTION_COUNT)
                .clamp(1, MAX_QUESTION_COUNT),
            difficulty: self.difficulty.unwrap_or_default(),
            subject: self
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("general")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// One entry per question, `null` for unanswered.
    pub answers: Vec<Option<usize>>,
    /// Seconds; measured from quiz creation when absent.
    #[validate(range(max = MAX_TIME_SPENT_SECS))]
    pub time_spent: Option<u64>,
}

/// Client-graded attempt, stored as-is after sanity checks.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveAttemptRequest {
    #[validate(custom(function = "validate_http_url"))]
    pub image_url: String,

    #[validate(length(
        min = 1,
        max = (MAX_QUESTION_COUNT as u64),
        message = "Quiz must contain between 1 and 10 questions"
    ))]
    pub questions: Vec<QuizQuestion>,

    #[serde(default)]
    pub user_answers: Vec<Option<usize>>,

    pub score: u32,

    pub total_questions: Option<u32>,

    #[validate(range(max = 100))]
    pub percentage: Option<u32>,

    #[serde(default)]
    #[validate(range(max = MAX_TIME_SPENT_SECS))]
    pub time_spent: u64,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
pub struct SetProviderRequest {
    pub provider: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit)
    }
}

/// Default 10, bounded to 1..=100.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(10).clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
            display_name: Some("Jane".to_string()),
        };
        assert!(valid.validate().is_ok());

        let weak = RegisterRequest {
            password: "12345".to_string(),
            ..valid.clone()
        };
        assert!(weak.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_generate_quiz_request_rejects_non_http_urls() {
        let request = GenerateQuizRequest {
            image_url: "ftp://example.com/cat.jpg".to_string(),
            num_questions: None,
            difficulty: None,
            subject: None,
            provider: None,
        };
        assert!(request.validate().is_err());

        let ok = GenerateQuizRequest {
            image_url: "https://picsum.photos/800/600".to_string(),
            ..request
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_time_spent_is_bounded() {
        let submit = SubmitQuizRequest {
            answers: vec![Some(0)],
            time_spent: Some(MAX_TIME_SPENT_SECS + 1),
        };
        assert!(submit.validate().is_err());

        let within = SubmitQuizRequest {
            time_spent: Some(MAX_TIME_SPENT_SECS),
            ..submit
        };
        assert!(within.validate().is_ok());
    }

    #[test]
    fn test_generation_options_defaults_and_bounds() {
        let request = GenerateQuizRequest {
            image_url: "https://example.com/a.png".to_string(),
            num_questions: Some(50),
            difficulty: Some(Difficulty::Hard),
            subject: Some("   ".to_string()),
            provider: None,
        };
        let options = request.generation_options();
        assert_eq!(options.num_questions, MAX_QUESTION_COUNT);
        assert_eq!(options.difficulty, Difficulty::Hard);
        assert_eq!(options.subject, "general");
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(1000)), 100);
    }
}
