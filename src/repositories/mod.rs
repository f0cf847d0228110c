pub mod quiz_attempt_repository;
pub mod quiz_repository;
pub mod refresh_token_repository;
pub mod user_progress_repository;
pub mod user_repository;

pub use quiz_attempt_repository::{AttemptTotals, MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use refresh_token_repository::{MongoRefreshTokenRepository, RefreshTokenRepository};
pub use user_progress_repository::{MongoUserProgressRepository, UserProgressRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
