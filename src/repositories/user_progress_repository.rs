use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, to_document, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::{Database, USER_PROGRESS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::UserProgress,
};

#[async_trait]
pub trait UserProgressRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>>;
    /// Stored progress, inserting a zeroed document if there is none.
    async fn find_or_create(&self, user_id: &str) -> AppResult<UserProgress>;
    /// Fold one attempt into the user's sums as a single write, so concurrent
    /// attempts never overwrite each other.
    async fn record_attempt(
        &self,
        user_id: &str,
        score: u32,
        percentage: u32,
        time_spent: u64,
    ) -> AppResult<UserProgress>;
    /// Highest average score first.
    async fn top_by_average(&self, limit: i64) -> AppResult<Vec<UserProgress>>;
    async fn count(&self) -> AppResult<u64>;
}

pub struct MongoUserProgressRepository {
    collection: Collection<UserProgress>,
}

impl MongoUserProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USER_PROGRESS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            )
            .build();

        let average_index = IndexModel::builder()
            .keys(doc! { "average_score": -1 })
            .options(IndexOptions::builder().name("average_score".to_string()).build())
            .build();

        self.collection.create_index(user_index).await?;
        self.collection.create_index(average_index).await?;

        log::info!("Successfully created indexes for user_progress collection");
        Ok(())
    }
}

fn upsert_returning_new() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build()
}

/// Update pipeline mirroring `UserProgress::apply_attempt`. Missing fields
/// count as zero so the same pipeline creates the document on first use.
fn attempt_pipeline(
    user_id: &str,
    score: u32,
    percentage: u32,
    time_spent: u64,
    now: Bson,
) -> Vec<Document> {
    let time_spent = i64::try_from(time_spent).unwrap_or(i64::MAX);

    vec![
        doc! {
            "$set": {
                "user_id": { "$literal": user_id },
                "total_quizzes": { "$add": [{ "$ifNull": ["$total_quizzes", 0_i64] }, 1_i64] },
                "total_score": { "$add": [{ "$ifNull": ["$total_score", 0_i64] }, i64::from(score)] },
                "best_score": { "$max": [{ "$ifNull": ["$best_score", 0_i64] }, i64::from(percentage)] },
                "total_time_spent": { "$add": [{ "$ifNull": ["$total_time_spent", 0_i64] }, time_spent] },
                "last_quiz_date": { "$literal": now.clone() },
                "created_at": { "$ifNull": ["$created_at", { "$literal": now.clone() }] },
                "updated_at": { "$literal": now },
            }
        },
        // Round half up, as f64::round does for non-negative values.
        doc! {
            "$set": {
                "average_score": {
                    "$toLong": {
                        "$floor": {
                            "$add": [{ "$divide": ["$total_score", "$total_quizzes"] }, 0.5]
                        }
                    }
                }
            }
        },
    ]
}

#[async_trait]
impl UserProgressRepository for MongoUserProgressRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        let progress = self.collection.find_one(doc! { "user_id": user_id }).await?;
        Ok(progress)
    }

    async fn find_or_create(&self, user_id: &str) -> AppResult<UserProgress> {
        let initial = to_document(&UserProgress::initial(user_id))?;
        self.collection
            .find_one_and_update(doc! { "user_id": user_id }, doc! { "$setOnInsert": initial })
            .with_options(upsert_returning_new())
            .await?
            .ok_or_else(|| AppError::DatabaseError("Progress upsert returned nothing".to_string()))
    }

    async fn record_attempt(
        &self,
        user_id: &str,
        score: u32,
        percentage: u32,
        time_spent: u64,
    ) -> AppResult<UserProgress> {
        let now = to_bson(&Utc::now())?;
        self.collection
            .find_one_and_update(
                doc! { "user_id": user_id },
                attempt_pipeline(user_id, score, percentage, time_spent, now),
            )
            .with_options(upsert_returning_new())
            .await?
            .ok_or_else(|| AppError::DatabaseError("Progress update returned nothing".to_string()))
    }

    async fn top_by_average(&self, limit: i64) -> AppResult<Vec<UserProgress>> {
        let options = FindOptions::builder()
            .sort(doc! { "average_score": -1 })
            .limit(Some(limit))
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        let items: Vec<UserProgress> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn count(&self) -> AppResult<u64> {
        let total = self.collection.count_documents(doc! {}).await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_pipeline_increments_from_missing_fields() {
        let now = Bson::String("2026-01-01T00:00:00Z".to_string());
        let pipeline = attempt_pipeline("u1", 4, 80, 30, now);

        assert_eq!(pipeline.len(), 2);
        let set = pipeline[0].get_document("$set").unwrap();
        let quizzes = set.get_document("total_quizzes").unwrap().get_array("$add").unwrap();
        assert_eq!(quizzes[1], Bson::Int64(1));

        let score = set.get_document("total_score").unwrap().get_array("$add").unwrap();
        assert_eq!(score[1], Bson::Int64(4));

        let best = set.get_document("best_score").unwrap().get_array("$max").unwrap();
        assert_eq!(best[1], Bson::Int64(80));
    }

    #[test]
    fn test_attempt_pipeline_recomputes_average_after_sums() {
        let pipeline = attempt_pipeline("u1", 1, 20, 5, Bson::Null);
        let average = pipeline[1]
            .get_document("$set")
            .unwrap()
            .get_document("average_score")
            .unwrap();

        assert!(average.contains_key("$toLong"));
    }

    #[test]
    fn test_attempt_pipeline_caps_huge_time() {
        let pipeline = attempt_pipeline("u1", 0, 0, u64::MAX, Bson::Null);
        let set = pipeline[0].get_document("$set").unwrap();
        let time = set.get_document("total_time_spent").unwrap().get_array("$add").unwrap();

        assert_eq!(time[1], Bson::Int64(i64::MAX));
    }
}
