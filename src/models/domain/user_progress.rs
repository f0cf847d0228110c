use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running totals over every attempt a user has saved.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct UserProgress {
    pub user_id: String,
    pub total_quizzes: u32,
    pub total_score: u32,
    pub average_score: u32,
    /// Best percentage reached on any single attempt.
    pub best_score: u32,
    /// Seconds.
    pub total_time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_quiz_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    pub fn initial(user_id: &str) -> Self {
        let now = Utc::now();
        UserProgress {
            user_id: user_id.to_string(),
            total_quizzes: 0,
            total_score: 0,
            average_score: 0,
            best_score: 0,
            total_time_spent: 0,
            last_quiz_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sums saturate instead of wrapping.
    pub fn apply_attempt(&mut self, score: u32, percentage: u32, time_spent: u64) {
        let now = Utc::now();
        self.total_quizzes = self.total_quizzes.saturating_add(1);
        self.total_score = self.total_score.saturating_add(score);
        self.average_score =
            (f64::from(self.total_score) / f64::from(self.total_quizzes)).round() as u32;
        self.best_score = self.best_score.max(percentage);
        self.total_time_spent = self.total_time_spent.saturating_add(time_spent);
        self.last_quiz_date = Some(now);
        self.updated_at = now;
    }
}

/// One row of the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, SimpleObject)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub display_name: String,
    pub average_score: u32,
    pub total_quizzes: u32,
    pub best_score: u32,
    pub total_time_spent: u64,
}

/// Aggregates over all saved attempts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, SimpleObject)]
pub struct QuizStatistics {
    pub total_attempts: u64,
    pub total_users: u64,
    pub average_score: u32,
    pub average_time_per_quiz: u64,
    pub total_time_spent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_progress_is_zeroed() {
        let progress = UserProgress::initial("u1");
        assert_eq!(progress.total_quizzes, 0);
        assert_eq!(progress.average_score, 0);
        assert!(progress.last_quiz_date.is_none());
    }

    #[test]
    fn test_apply_attempt_keeps_running_sums() {
        let mut progress = UserProgress::initial("u1");
        progress.apply_attempt(4, 80, 30);
        progress.apply_attempt(3, 60, 45);

        assert_eq!(progress.total_quizzes, 2);
        assert_eq!(progress.total_score, 7);
        // 7 / 2 = 3.5 rounds away from zero
        assert_eq!(progress.average_score, 4);
        assert_eq!(progress.best_score, 80);
        assert_eq!(progress.total_time_spent, 75);
        assert!(progress.last_quiz_date.is_some());
    }

    #[test]
    fn test_apply_attempt_saturates_at_limits() {
        let mut progress = UserProgress::initial("u1");
        progress.total_score = u32::MAX - 1;
        progress.total_time_spent = u64::MAX - 1;

        progress.apply_attempt(10, 100, 10);

        assert_eq!(progress.total_score, u32::MAX);
        assert_eq!(progress.total_time_spent, u64::MAX);
        assert_eq!(progress.total_quizzes, 1);
    }

    #[test]
    fn test_best_score_never_decreases() {
        let mut progress = UserProgress::initial("u1");
        progress.apply_attempt(5, 100, 10);
        progress.apply_attempt(0, 0, 10);
        assert_eq!(progress.best_score, 100);
    }
}
