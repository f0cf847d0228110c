use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    quiz::GenerationOptions, AuthProvider, GeneratedQuiz, QuestionForTaking, QuizAttempt, User,
    UserRole,
};

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            auth_provider: user.auth_provider,
            role: user.role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserDto,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct GoogleAuthorizeResponse {
    pub url: String,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A generated quiz without answers.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizForTaking {
    pub id: String,
    pub image_url: String,
    pub questions: Vec<QuestionForTaking>,
    pub total_questions: usize,
    pub provider: Option<String>,
    pub used_fallback: bool,
    pub options: GenerationOptions,
    pub created_at: DateTime<Utc>,
}

impl From<&GeneratedQuiz> for QuizForTaking {
    fn from(quiz: &GeneratedQuiz) -> Self {
        QuizForTaking {
            id: quiz.id.clone(),
            image_url: quiz.image_url.clone(),
            questions: quiz.questions_for_taking(),
            total_questions: quiz.total_questions(),
            provider: quiz.provider.clone(),
            used_fallback: quiz.used_fallback,
            options: quiz.options.clone(),
            created_at: quiz.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
    pub selected_answer: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizResultResponse {
    pub attempt_id: String,
    pub quiz_id: Option<String>,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_spent: u64,
    pub feedback: String,
    pub review: Vec<QuestionReview>,
}

impl QuizResultResponse {
    pub fn from_attempt(attempt: &QuizAttempt, feedback: &str) -> Self {
        let review = attempt
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let selected_answer = attempt.user_answers.get(index).copied().flatten();
                QuestionReview {
                    index,
                    question: q.question.clone(),
                    options: q.options.clone(),
                    selected_answer,
                    correct_answer: q.correct_answer,
                    is_correct: q.is_correct(selected_answer),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        QuizResultResponse {
            attempt_id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage: attempt.percentage,
            time_spent: attempt.time_spent,
            feedback: feedback.to_string(),
            review,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveAttemptResponse {
    pub success: bool,
    pub attempt_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T: Serialize> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}
