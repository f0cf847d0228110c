use std::{collections::HashMap, sync::Arc};

use crate::{
    errors::AppResult,
    models::domain::{LeaderboardEntry, UserProgress},
    repositories::{UserProgressRepository, UserRepository},
};

const ANONYMOUS: &str = "Anonymous User";

pub struct ProgressService {
    progress: Arc<dyn UserProgressRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProgressService {
    pub fn new(progress: Arc<dyn UserProgressRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { progress, users }
    }

    /// Stored progress, created zeroed on first access.
    pub async fn get_progress(&self, user_id: &str) -> AppResult<UserProgress> {
        self.progress.find_or_create(user_id).await
    }

    pub async fn record_attempt(
        &self,
        user_id: &str,
        score: u32,
        percentage: u32,
        time_spent: u64,
    ) -> AppResult<UserProgress> {
        let progress = self
            .progress
            .record_attempt(user_id, score, percentage, time_spent)
            .await?;
        log::debug!(
            "Progress for {} now at {} quizzes",
            user_id,
            progress.total_quizzes
        );
        Ok(progress)
    }

    pub async fn leaderboard(&self, limit: i64) -> AppResult<Vec<LeaderboardEntry>> {
        let top = self.progress.top_by_average(limit).await?;

        let ids: Vec<String> = top.iter().map(|p| p.user_id.clone()).collect();
        let names: HashMap<String, String> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u.public_name().to_string()))
            .collect();

        let entries = top
            .into_iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i as u32 + 1,
                display_name: names
                    .get(&p.user_id)
                    .cloned()
                    .unwrap_or_else(|| ANONYMOUS.to_string()),
                user_id: p.user_id,
                average_score: p.average_score,
                total_quizzes: p.total_quizzes,
                best_score: p.best_score,
                total_time_spent: p.total_time_spent,
            })
            .collect();

        Ok(entries)
    }

    pub async fn user_count(&self) -> AppResult<u64> {
        self.progress.count().await
    }
}
