use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{request::LimitParams, response::ListResponse},
};

#[get("/progress")]
pub async fn get_progress(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state.progress_service.get_progress(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<AppState>,
    query: web::Query<LimitParams>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let entries = state.progress_service.leaderboard(query.limit()).await?;
    Ok(HttpResponse::Ok().json(ListResponse::from(entries)))
}

#[get("/statistics")]
pub async fn statistics(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.attempt_service.statistics().await?;
    Ok(HttpResponse::Ok().json(stats))
}
