use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{
            quiz_attempt::{percentage, GradedAnswers},
            quiz_question::OPTIONS_PER_QUESTION,
            QuizAttempt, QuizQuestion, QuizStatistics,
        },
        dto::{request::SaveAttemptRequest, response::SaveAttemptResponse},
    },
    repositories::QuizAttemptRepository,
    services::progress_service::ProgressService,
};

pub struct QuizAttemptService {
    attempts: Arc<dyn QuizAttemptRepository>,
    progress: Arc<ProgressService>,
}

impl QuizAttemptService {
    pub fn new(attempts: Arc<dyn QuizAttemptRepository>, progress: Arc<ProgressService>) -> Self {
        Self { attempts, progress }
    }

    /// Grade submitted answers against the stored questions.
    pub fn grade_answers(
        questions: &[QuizQuestion],
        answers: &[Option<usize>],
    ) -> AppResult<GradedAnswers> {
        if answers.len() != questions.len() {
            return Err(AppError::ValidationError(format!(
                "Expected {} answers, got {}",
                questions.len(),
                answers.len()
            )));
        }
        validate_answer_indices(answers)?;

        let score = questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.is_correct(**a))
            .count() as u32;
        let total_questions = questions.len() as u32;

        Ok(GradedAnswers {
            score,
            total_questions,
            percentage: percentage(score, total_questions),
        })
    }

    /// Persist an attempt and fold it into the user's progress.
    pub async fn record(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let attempt = self.attempts.create(attempt).await?;
        self.progress
            .record_attempt(
                &attempt.user_id,
                attempt.score,
                attempt.percentage,
                attempt.time_spent,
            )
            .await?;

        log::info!(
            "Saved attempt {} for user {} ({}%)",
            attempt.id,
            attempt.user_id,
            attempt.percentage
        );
        Ok(attempt)
    }

    /// Store an attempt graded by the client.
    pub async fn save_attempt(
        &self,
        claims: &Claims,
        request: SaveAttemptRequest,
    ) -> AppResult<SaveAttemptResponse> {
        request.validate()?;
        validate_answer_indices(&request.user_answers)?;

        let total_questions = request.questions.len() as u32;
        if let Some(claimed) = request.total_questions {
            if claimed != total_questions {
                return Err(AppError::ValidationError(format!(
                    "Total questions {} does not match the {} questions sent",
                    claimed, total_questions
                )));
            }
        }
        if request.score > total_questions {
            return Err(AppError::ValidationError(format!(
                "Score {} exceeds total questions {}",
                request.score, total_questions
            )));
        }

        let graded = GradedAnswers {
            score: request.score,
            total_questions,
            percentage: request
                .percentage
                .unwrap_or_else(|| percentage(request.score, total_questions)),
        };

        let attempt = QuizAttempt::new(
            &claims.sub,
            &claims.display_name,
            None,
            request.image_url.trim(),
            request.questions,
            request.user_answers,
            &graded,
            request.time_spent,
        );
        let attempt = self.record(attempt).await?;

        Ok(SaveAttemptResponse {
            success: true,
            attempt_id: attempt.id,
            message: "Quiz attempt saved successfully".to_string(),
        })
    }

    pub async fn list_attempts(&self, claims: &Claims, limit: i64) -> AppResult<Vec<QuizAttempt>> {
        self.attempts.list_for_user(&claims.sub, limit).await
    }

    pub async fn get_attempt(&self, claims: &Claims, id: &str) -> AppResult<QuizAttempt> {
        let attempt = self
            .attempts
            .find_by_id(id)
            .await?
            .filter(|a| !a.deleted)
            .ok_or_else(|| AppError::NotFound(format!("Quiz attempt '{}' not found", id)))?;

        require_owner_or_admin(claims, &attempt.user_id)?;
        Ok(attempt)
    }

    pub async fn delete_attempt(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let attempt = self.get_attempt(claims, id).await?;
        self.attempts.soft_delete(&attempt.id).await?;
        log::info!("Attempt {} deleted by {}", attempt.id, claims.sub);
        Ok(())
    }

    pub async fn statistics(&self) -> AppResult<QuizStatistics> {
        let totals = self.attempts.totals().await?;
        let total_users = self.progress.user_count().await?;

        if totals.attempts == 0 {
            return Ok(QuizStatistics {
                total_users,
                ..QuizStatistics::default()
            });
        }

        let average_score = if totals.total_questions == 0 {
            0
        } else {
            (totals.total_score as f64 / totals.total_questions as f64 * 100.0).round() as u32
        };

        Ok(QuizStatistics {
            total_attempts: totals.attempts,
            total_users,
            average_score,
            average_time_per_quiz: (totals.total_time_spent as f64 / totals.attempts as f64)
                .round() as u64,
            total_time_spent: totals.total_time_spent,
        })
    }
}

fn validate_answer_indices(answers: &[Option<usize>]) -> AppResult<()> {
    match answers
        .iter()
        .position(|a| matches!(a, Some(i) if *i >= OPTIONS_PER_QUESTION))
    {
        Some(index) => Err(AppError::ValidationError(format!(
            "Answer for question {} must be between 0 and {}",
            index + 1,
            OPTIONS_PER_QUESTION - 1
        ))),
        None => Ok(()),
    }
}
