pub mod attempt_handler;
pub mod auth_handler;
pub mod graphql_handler;
pub mod health_handler;
pub mod progress_handler;
pub mod quiz_handler;

use actix_web::web;

use crate::auth::AuthMiddleware;

pub use health_handler::{health_check, health_check_live, health_check_ready};

/// Registers every route. Everything under `/api` requires a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(auth_handler::register)
        .service(auth_handler::login)
        .service(auth_handler::google_authorize_url)
        .service(auth_handler::google_callback)
        .service(auth_handler::refresh_token)
        .service(graphql_handler::graphql)
        .service(graphql_handler::graphiql)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(auth_handler::logout)
                .service(auth_handler::me)
                .service(quiz_handler::list_providers)
                .service(quiz_handler::set_provider)
                .service(quiz_handler::generate_quiz)
                .service(quiz_handler::get_quiz)
                .service(quiz_handler::submit_quiz)
                .service(attempt_handler::save_attempt)
                .service(attempt_handler::list_attempts)
                .service(attempt_handler::get_attempt)
                .service(attempt_handler::delete_attempt)
                .service(progress_handler::get_progress)
                .service(progress_handler::leaderboard)
                .service(progress_handler::statistics),
        );
}
