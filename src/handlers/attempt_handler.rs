use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{LimitParams, SaveAttemptRequest},
        response::{ListResponse, MessageResponse},
    },
};

#[post("/attempts")]
pub async fn save_attempt(
    state: web::Data<AppState>,
    request: web::Json<SaveAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .attempt_service
        .save_attempt(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/attempts")]
pub async fn list_attempts(
    state: web::Data<AppState>,
    query: web::Query<LimitParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .attempt_service
        .list_attempts(&auth.0, query.limit())
        .await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(attempts)))
}

#[get("/attempts/{id}")]
pub async fn get_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.get_attempt(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[delete("/attempts/{id}")]
pub async fn delete_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.attempt_service.delete_attempt(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz attempt deleted")))
}
