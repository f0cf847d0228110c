pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod refresh_token;
pub mod user;
pub mod user_progress;

pub use quiz::{Difficulty, GeneratedQuiz, GenerationOptions};
pub use quiz_attempt::QuizAttempt;
pub use quiz_question::{QuestionForTaking, QuizQuestion};
pub use refresh_token::RefreshToken;
pub use user::{AuthProvider, User, UserRole};
pub use user_progress::{LeaderboardEntry, QuizStatistics, UserProgress};
