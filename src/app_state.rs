use std::sync::Arc;

use crate::{
    auth::{
        google::{GoogleOAuth, GoogleOAuthClient},
        JwtService,
    },
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizAttemptRepository, MongoQuizRepository, MongoRefreshTokenRepository,
        MongoUserProgressRepository, MongoUserRepository, QuizAttemptRepository, QuizRepository,
        RefreshTokenRepository, UserProgressRepository, UserRepository,
    },
    services::{AuthService, ProgressService, QuizAttemptService, QuizGenerator, QuizService},
};

/// Storage backends the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub progress: Arc<dyn UserProgressRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when running on injected repositories.
    pub database: Option<Database>,
    pub jwt_service: Arc<JwtService>,
    pub generator: Arc<QuizGenerator>,
    pub auth_service: Arc<AuthService>,
    pub quiz_service: Arc<QuizService>,
    pub attempt_service: Arc<QuizAttemptService>,
    pub progress_service: Arc<ProgressService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;

        let quizzes = Arc::new(MongoQuizRepository::new(&db));
        quizzes.ensure_indexes().await?;

        let attempts = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempts.ensure_indexes().await?;

        let progress = Arc::new(MongoUserProgressRepository::new(&db));
        progress.ensure_indexes().await?;

        let refresh_tokens = Arc::new(MongoRefreshTokenRepository::new(&db));
        refresh_tokens.ensure_indexes().await?;
        let purged = refresh_tokens.delete_expired().await?;
        if purged > 0 {
            log::info!("Purged {} expired refresh tokens", purged);
        }

        let repositories = Repositories {
            users,
            quizzes,
            attempts,
            progress,
            refresh_tokens,
        };
        let generator = Arc::new(QuizGenerator::from_config(&config.ai));
        let google: Arc<dyn GoogleOAuthClient> = Arc::new(GoogleOAuth::new(&config));

        let mut state = Self::from_parts(config, repositories, generator, google);
        state.database = Some(db);
        Ok(state)
    }

    pub fn from_parts(
        config: Config,
        repositories: Repositories,
        generator: Arc<QuizGenerator>,
        google: Arc<dyn GoogleOAuthClient>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.jwt_refresh_expiration_hours,
        ));

        let auth_service = Arc::new(AuthService::new(
            repositories.users.clone(),
            repositories.refresh_tokens,
            jwt_service.clone(),
            google,
        ));
        let progress_service = Arc::new(ProgressService::new(
            repositories.progress,
            repositories.users,
        ));
        let attempt_service = Arc::new(QuizAttemptService::new(
            repositories.attempts,
            progress_service.clone(),
        ));
        let quiz_service = Arc::new(QuizService::new(
            repositories.quizzes,
            generator.clone(),
            attempt_service.clone(),
        ));

        Self {
            config: Arc::new(config),
            database: None,
            jwt_service,
            generator,
            auth_service,
            quiz_service,
            attempt_service,
            progress_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
