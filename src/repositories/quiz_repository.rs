use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUIZZES_COLLECTION},
    errors::AppResult,
    models::domain::GeneratedQuiz,
};

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: GeneratedQuiz) -> AppResult<GeneratedQuiz>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedQuiz>>;
}

pub struct MongoQuizRepository {
    collection: Collection<GeneratedQuiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZZES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .options(IndexOptions::builder().name("user_created".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: GeneratedQuiz) -> AppResult<GeneratedQuiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedQuiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }
}
