pub mod auth_service;
pub mod progress_service;
pub mod quiz_attempt_service;
pub mod quiz_generator;
pub mod quiz_service;

pub use auth_service::AuthService;
pub use progress_service::ProgressService;
pub use quiz_attempt_service::QuizAttemptService;
pub use quiz_generator::{GenerationOutcome, QuizGenerator};
pub use quiz_service::QuizService;
