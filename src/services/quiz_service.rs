use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::{quiz::MAX_TIME_SPENT_SECS, GeneratedQuiz, QuizAttempt},
        dto::{
            request::{GenerateQuizRequest, SubmitQuizRequest},
            response::{QuizForTaking, QuizResultResponse},
        },
    },
    repositories::QuizRepository,
    services::{quiz_attempt_service::QuizAttemptService, quiz_generator::QuizGenerator},
};

/// Encouragement shown with the result, by percentage.
pub fn feedback_message(percentage: u32) -> &'static str {
    match percentage {
        100.. => "Perfect! You were very observant!",
        80..=99 => "Great job! You paid good attention!",
        60..=79 => "Good effort! Maybe watch the image again?",
        _ => "You might want to look at the image more carefully next time!",
    }
}

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    generator: Arc<QuizGenerator>,
    attempts: Arc<QuizAttemptService>,
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        generator: Arc<QuizGenerator>,
        attempts: Arc<QuizAttemptService>,
    ) -> Self {
        Self {
            repository,
            generator,
            attempts,
        }
    }

    pub async fn generate_quiz(
        &self,
        claims: &Claims,
        request: GenerateQuizRequest,
    ) -> AppResult<QuizForTaking> {
        request.validate()?;

        let preferred = request
            .provider
            .as_deref()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
        if let Some(name) = &preferred {
            if !self.generator.is_known(name) {
                return Err(AppError::ValidationError(format!("Unknown provider '{}'", name)));
            }
        }

        let options = request.generation_options();
        let image_url = request.image_url.trim();
        let outcome = self
            .generator
            .generate_quiz_from_image(image_url, &options, preferred.as_deref())
            .await;

        let quiz = GeneratedQuiz::new(
            &claims.sub,
            image_url,
            outcome.questions,
            outcome.provider,
            outcome.used_fallback,
            options,
        );
        let quiz = self.repository.create(quiz).await?;

        log::info!(
            "Generated quiz {} with {} questions for user {}",
            quiz.id,
            quiz.total_questions(),
            claims.sub
        );
        Ok(QuizForTaking::from(&quiz))
    }

    async fn find_owned(&self, claims: &Claims, id: &str) -> AppResult<GeneratedQuiz> {
        let quiz = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;

        if quiz.user_id != claims.sub {
            return Err(AppError::Forbidden(
                "You can only access your own quizzes".to_string(),
            ));
        }
        Ok(quiz)
    }

    pub async fn get_quiz(&self, claims: &Claims, id: &str) -> AppResult<QuizForTaking> {
        let quiz = self.find_owned(claims, id).await?;
        Ok(QuizForTaking::from(&quiz))
    }

    pub async fn submit_quiz(
        &self,
        claims: &Claims,
        id: &str,
        request: SubmitQuizRequest,
    ) -> AppResult<QuizResultResponse> {
        request.validate()?;
        let quiz = self.find_owned(claims, id).await?;

        let graded = QuizAttemptService::grade_answers(&quiz.questions, &request.answers)?;
        let time_spent = request.time_spent.unwrap_or_else(|| {
            ((Utc::now() - quiz.created_at).num_seconds().max(0) as u64).min(MAX_TIME_SPENT_SECS)
        });

        let attempt = QuizAttempt::new(
            &claims.sub,
            &claims.display_name,
            Some(quiz.id.clone()),
            &quiz.image_url,
            quiz.questions,
            request.answers,
            &graded,
            time_spent,
        );
        let attempt = self.attempts.record(attempt).await?;

        Ok(QuizResultResponse::from_attempt(
            &attempt,
            feedback_message(attempt.percentage),
        ))
    }
}
