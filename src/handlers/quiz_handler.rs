use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{GenerateQuizRequest, SetProviderRequest, SubmitQuizRequest},
        response::MessageResponse,
    },
};

#[get("/providers")]
pub async fn list_providers(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let providers = state.generator.available_providers().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "current": state.generator.current_provider().await,
        "providers": providers,
    })))
}

#[put("/providers/current")]
pub async fn set_provider(
    state: web::Data<AppState>,
    request: web::Json<SetProviderRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let name = request.provider.trim().to_lowercase();
    if !state.generator.set_provider(&name).await {
        return Err(AppError::ValidationError(format!("Unknown provider '{}'", name)));
    }
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("Provider set to {}", name))))
}

#[post("/quizzes")]
pub async fn generate_quiz(
    state: web::Data<AppState>,
    request: web::Json<GenerateQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .generate_quiz(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[get("/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/quizzes/{id}/submit")]
pub async fn submit_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state
        .quiz_service
        .submit_quiz(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
