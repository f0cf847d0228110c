use crate::{
    auth::Claims,
    models::domain::{QuizQuestion, User, UserRole},
};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Creates a standard test user
    pub fn test_user() -> User {
        User::test_user("test@example.com")
    }

    /// Claims as issued to `user`, valid far into the future.
    pub fn claims_for(user: &User) -> Claims {
        Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            display_name: user.public_name().to_string(),
            role: user.role,
            iat: 0,
            exp: 9_999_999_999,
        }
    }

    pub fn admin_claims() -> Claims {
        let mut user = User::test_user("admin@example.com");
        user.role = UserRole::Admin;
        claims_for(&user)
    }

    /// Three questions whose correct answers are 0, 1 and 2.
    pub fn sample_questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new("What is shown?", ["A cat", "A dog", "A car", "A tree"], 0, "Whiskers."),
            QuizQuestion::new("Which colour dominates?", ["Red", "Green", "Blue", "Grey"], 1, "Grass."),
            QuizQuestion::new("When was it taken?", ["Dawn", "Noon", "Dusk", "Night"], 2, "Long shadows."),
        ]
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::*;

    #[test]
    fn test_fixtures_claims_match_user() {
        let user = test_user();
        let claims = claims_for(&user);
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.display_name, "test");
        assert!(admin_claims().is_admin());
    }

    #[test]
    fn test_sample_questions_are_well_formed() {
        let questions = sample_questions();
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn test_status_helpers() {
        assert_error_status(actix_web::http::StatusCode::NOT_FOUND);
        assert_success_status(actix_web::http::StatusCode::CREATED);
    }
}
