#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use snapquiz_server::{
    app_state::{AppState, Repositories},
    auth::google::{GoogleOAuthClient, GoogleProfile},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        GeneratedQuiz, GenerationOptions, QuizAttempt, QuizQuestion, RefreshToken, User,
        UserProgress,
    },
    providers::{HuggingFaceProvider, ProviderError, ProviderResult, QuizProvider},
    repositories::{
        AttemptTotals, QuizAttemptRepository, QuizRepository, RefreshTokenRepository,
        UserProgressRepository, UserRepository,
    },
    services::QuizGenerator,
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User '{}' not found", user.id)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<HashMap<String, GeneratedQuiz>>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: GeneratedQuiz) -> AppResult<GeneratedQuiz> {
        self.quizzes
            .write()
            .await
            .insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedQuiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryQuizAttemptRepository {
    attempts: RwLock<HashMap<String, QuizAttempt>>,
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.attempts
            .write()
            .await
            .insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.user_id == user_id && !a.deleted)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz attempt '{}' not found", id)))?;
        attempt.deleted = true;
        attempt.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn totals(&self) -> AppResult<AttemptTotals> {
        let attempts = self.attempts.read().await;
        let live = attempts.values().filter(|a| !a.deleted);

        let mut totals = AttemptTotals::default();
        for attempt in live {
            totals.attempts += 1;
            totals.total_score += u64::from(attempt.score);
            totals.total_questions += u64::from(attempt.total_questions);
            totals.total_time_spent += attempt.time_spent;
        }
        Ok(totals)
    }
}

#[derive(Default)]
pub struct InMemoryUserProgressRepository {
    progress: RwLock<HashMap<String, UserProgress>>,
}

#[async_trait]
impl UserProgressRepository for InMemoryUserProgressRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        Ok(self.progress.read().await.get(user_id).cloned())
    }

    async fn find_or_create(&self, user_id: &str) -> AppResult<UserProgress> {
        let mut progress = self.progress.write().await;
        Ok(progress
            .entry(user_id.to_string())
            .or_insert_with(|| UserProgress::initial(user_id))
            .clone())
    }

    async fn record_attempt(
        &self,
        user_id: &str,
        score: u32,
        percentage: u32,
        time_spent: u64,
    ) -> AppResult<UserProgress> {
        let mut progress = self.progress.write().await;
        let entry = progress
            .entry(user_id.to_string())
            .or_insert_with(|| UserProgress::initial(user_id));
        entry.apply_attempt(score, percentage, time_spent);
        Ok(entry.clone())
    }

    async fn top_by_average(&self, limit: i64) -> AppResult<Vec<UserProgress>> {
        let progress = self.progress.read().await;
        let mut items: Vec<_> = progress.values().cloned().collect();
        items.sort_by(|a, b| {
            b.average_score
                .cmp(&a.average_score)
                .then(b.total_quizzes.cmp(&a.total_quizzes))
        });
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.progress.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn redeem(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if token.is_valid() => {
                let redeemed = token.clone();
                token.revoke();
                Ok(Some(redeemed))
            }
            _ => Ok(None),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let mut revoked = 0;
        for token in self.tokens.write().await.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoke();
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Google client that always returns the same profile.
pub struct StubGoogleOAuth {
    pub profile: GoogleProfile,
}

impl Default for StubGoogleOAuth {
    fn default() -> Self {
        Self {
            profile: GoogleProfile {
                sub: "google-123".to_string(),
                email: "grace@example.com".to_string(),
                email_verified: true,
                name: Some("Grace".to_string()),
                picture: Some("https://example.com/grace.png".to_string()),
            },
        }
    }
}

#[async_trait]
impl GoogleOAuthClient for StubGoogleOAuth {
    fn authorize_url(
        &self,
        state: Option<String>,
        _redirect_uri: Option<String>,
    ) -> AppResult<String> {
        Ok(format!(
            "https://accounts.google.com/o/oauth2/v2/auth?state={}",
            state.unwrap_or_default()
        ))
    }

    async fn fetch_profile(
        &self,
        code: &str,
        _redirect_uri: Option<String>,
    ) -> AppResult<GoogleProfile> {
        match code {
            "bad-code" => Err(AppError::ExternalServiceError(
                "Failed to exchange authorization code".to_string(),
            )),
            "unverified-code" => Ok(GoogleProfile {
                email_verified: false,
                ..self.profile.clone()
            }),
            _ => Ok(self.profile.clone()),
        }
    }
}

/// Provider that always fails and counts how often it was asked.
pub struct FailingProvider {
    pub calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn display_name(&self) -> &'static str {
        "Broken"
    }

    fn is_free(&self) -> bool {
        true
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn is_local(&self) -> bool {
        false
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate_quiz_from_image(
        &self,
        _image_url: &str,
        _options: &GenerationOptions,
    ) -> ProviderResult<Vec<QuizQuestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Api("model overloaded".to_string()))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub attempts: Arc<InMemoryQuizAttemptRepository>,
    pub progress: Arc<InMemoryUserProgressRepository>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
}

/// Offline generator: the URL-pattern provider is always available.
pub fn offline_generator() -> Arc<QuizGenerator> {
    Arc::new(QuizGenerator::new(
        vec![Arc::new(HuggingFaceProvider::new())],
        "huggingface",
        vec!["huggingface".to_string()],
    ))
}

pub fn test_context_with_generator(generator: Arc<QuizGenerator>) -> TestContext {
    let users = Arc::new(InMemoryUserRepository::default());
    let attempts = Arc::new(InMemoryQuizAttemptRepository::default());
    let progress = Arc::new(InMemoryUserProgressRepository::default());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::default());

    let repositories = Repositories {
        users: users.clone(),
        quizzes: Arc::new(InMemoryQuizRepository::default()),
        attempts: attempts.clone(),
        progress: progress.clone(),
        refresh_tokens: refresh_tokens.clone(),
    };

    let state = AppState::from_parts(
        Config::test_config(),
        repositories,
        generator,
        Arc::new(StubGoogleOAuth::default()),
    );

    TestContext {
        state,
        users,
        attempts,
        progress,
        refresh_tokens,
    }
}

pub fn test_context() -> TestContext {
    test_context_with_generator(offline_generator())
}

pub fn sample_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new("What is shown?", ["A cat", "A dog", "A car", "A tree"], 0, "Whiskers."),
        QuizQuestion::new("Which colour dominates?", ["Red", "Green", "Blue", "Grey"], 1, "Grass."),
        QuizQuestion::new("When was it taken?", ["Dawn", "Noon", "Dusk", "Night"], 2, "Long shadows."),
    ]
}
