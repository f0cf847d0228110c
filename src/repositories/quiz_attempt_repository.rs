use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, QUIZ_ATTEMPTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::QuizAttempt,
};

/// Sums over every attempt that has not been deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptTotals {
    pub attempts: u64,
    pub total_score: u64,
    pub total_questions: u64,
    pub total_time_spent: u64,
}

#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    /// Newest first, deleted attempts excluded.
    async fn list_for_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<QuizAttempt>>;
    async fn soft_delete(&self, id: &str) -> AppResult<()>;
    async fn totals(&self) -> AppResult<AttemptTotals>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZ_ATTEMPTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_completed_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_completed".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_completed_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

fn sum_field(doc: &Document, key: &str) -> u64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => (*v).max(0) as u64,
        Some(Bson::Int64(v)) => (*v).max(0) as u64,
        Some(Bson::Double(v)) => v.max(0.0) as u64,
        _ => 0,
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<QuizAttempt>> {
        let options = FindOptions::builder()
            .sort(doc! { "completed_at": -1 })
            .limit(Some(limit))
            .build();

        let cursor = self
            .collection
            .find(doc! { "user_id": user_id, "deleted": { "$ne": true } })
            .with_options(options)
            .await?;
        let attempts: Vec<QuizAttempt> = cursor.try_collect().await?;
        Ok(attempts)
    }

    async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let deleted_at = mongodb::bson::to_bson(&Utc::now())?;
        let result = self
            .collection
            .update_one(
                doc! { "id": id, "deleted": { "$ne": true } },
                doc! { "$set": { "deleted": true, "deleted_at": deleted_at } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Quiz attempt '{}' not found", id)));
        }

        Ok(())
    }

    async fn totals(&self) -> AppResult<AttemptTotals> {
        let pipeline = vec![
            doc! { "$match": { "deleted": { "$ne": true } } },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "attempts": { "$sum": 1 },
                    "total_score": { "$sum": "$score" },
                    "total_questions": { "$sum": "$total_questions" },
                    "total_time_spent": { "$sum": "$time_spent" },
                }
            },
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        let totals = match cursor.try_next().await? {
            Some(doc) => AttemptTotals {
                attempts: sum_field(&doc, "attempts"),
                total_score: sum_field(&doc, "total_score"),
                total_questions: sum_field(&doc, "total_questions"),
                total_time_spent: sum_field(&doc, "total_time_spent"),
            },
            None => AttemptTotals::default(),
        };

        Ok(totals)
    }
}
