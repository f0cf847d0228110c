use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::QuizQuestion;

pub const IMAGE_QUIZ_TYPE: &str = "image-based";

/// One completed run through a set of questions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    pub image_url: String,
    pub questions: Vec<QuizQuestion>,
    /// Chosen option index per question, `None` when left unanswered.
    pub user_answers: Vec<Option<usize>>,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    /// Seconds.
    pub time_spent: u64,
    pub quiz_type: String,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[graphql(skip)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[graphql(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Grading result for a set of answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradedAnswers {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
}

impl QuizAttempt {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        user_name: &str,
        quiz_id: Option<String>,
        image_url: &str,
        questions: Vec<QuizQuestion>,
        user_answers: Vec<Option<usize>>,
        graded: &GradedAnswers,
        time_spent: u64,
    ) -> Self {
        let now = Utc::now();
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            quiz_id,
            image_url: image_url.to_string(),
            questions,
            user_answers,
            score: graded.score,
            total_questions: graded.total_questions,
            percentage: graded.percentage,
            time_spent,
            quiz_type: IMAGE_QUIZ_TYPE.to_string(),
            completed_at: now,
            created_at: now,
            deleted: false,
            deleted_at: None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.user_answers.iter().filter(|a| a.is_some()).count()
    }
}

/// Rounded percentage, 0 when there are no questions.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(score) / f64::from(total) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_attempt(score: u32, total: u32) -> QuizAttempt {
        let graded = GradedAnswers {
            score,
            total_questions: total,
            percentage: percentage(score, total),
        };
        QuizAttempt::new(
            "user-1",
            "Tester",
            None,
            "https://example.com/cat.jpg",
            vec![QuizQuestion::new("Q?", ["a", "b", "c", "d"], 0, "e")],
            vec![Some(0), None],
            &graded,
            42,
        )
    }

    #[test]
    fn test_percentage_rounds_to_nearest() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_new_attempt_is_image_based_and_live() {
        let attempt = make_attempt(3, 5);
        assert_eq!(attempt.quiz_type, IMAGE_QUIZ_TYPE);
        assert_eq!(attempt.percentage, 60);
        assert!(!attempt.deleted);
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn test_attempt_deserializes_without_deletion_fields() {
        let attempt = make_attempt(1, 1);
        let mut json = serde_json::to_value(&attempt).unwrap();
        json.as_object_mut().unwrap().remove("deleted");

        let parsed: QuizAttempt = serde_json::from_value(json).unwrap();
        assert!(!parsed.deleted);
        assert_eq!(parsed.user_answers, vec![Some(0), None]);
    }
}
