use async_trait::async_trait;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, USERS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USERS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await.map_err(|e| {
            if e.to_string().contains("E11000") {
                AppError::AlreadyExists("An account with this email already exists.".to_string())
            } else {
                AppError::from(e)
            }
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "email": email.to_lowercase() })
            .await?;
        Ok(user)
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "google_id": google_id })
            .await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        use futures::TryStreamExt;

        let cursor = self.collection.find(doc! { "id": { "$in": ids } }).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        Ok(user)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let id_model = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(id_model).await?;

        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(email_model).await?;
        log::info!("Created unique index on users.email");

        let google_model = IndexModel::builder()
            .keys(doc! { "google_id": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();
        self.collection.create_index(google_model).await?;

        Ok(())
    }
}
