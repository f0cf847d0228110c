use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::{QuestionForTaking, QuizQuestion};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 10;
/// Upper bound on a single attempt's duration, in seconds.
pub const MAX_TIME_SPENT_SECS: u64 = 86_400;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn prompt_text(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy (suitable for beginners)",
            Difficulty::Medium => "medium (moderate difficulty)",
            Difficulty::Hard => "hard (challenging for experts)",
        }
    }
}

/// Knobs passed to every question provider.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct GenerationOptions {
    pub num_questions: usize,
    pub difficulty: Difficulty,
    pub subject: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            num_questions: DEFAULT_QUESTION_COUNT,
            difficulty: Difficulty::Medium,
            subject: "general".to_string(),
        }
    }
}

/// Questions generated for one image, owned by the user who asked for them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedQuiz {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub used_fallback: bool,
    pub options: GenerationOptions,
    pub created_at: DateTime<Utc>,
}

impl GeneratedQuiz {
    pub fn new(
        user_id: &str,
        image_url: &str,
        questions: Vec<QuizQuestion>,
        provider: Option<String>,
        used_fallback: bool,
        options: GenerationOptions,
    ) -> Self {
        GeneratedQuiz {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            image_url: image_url.to_string(),
            questions,
            provider,
            used_fallback,
            options,
            created_at: Utc::now(),
        }
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn questions_for_taking(&self) -> Vec<QuestionForTaking> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| QuestionForTaking::from_question(i, q))
            .collect()
    }
}
