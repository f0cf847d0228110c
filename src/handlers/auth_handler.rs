use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{
            GoogleAuthorizeParams, GoogleCallbackParams, LoginRequest, RefreshTokenRequest,
            RegisterRequest,
        },
        response::MessageResponse,
    },
};

#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.sign_in(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/auth/google/url")]
pub async fn google_authorize_url(
    state: web::Data<AppState>,
    web::Query(params): web::Query<GoogleAuthorizeParams>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.google_authorize_url(params)?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/auth/google/callback")]
pub async fn google_callback(
    state: web::Data<AppState>,
    web::Query(params): web::Query<GoogleCallbackParams>,
) -> Result<HttpResponse, AppError> {
    log::info!("Google OAuth callback received");
    let response = state.auth_service.google_callback(params).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/auth/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.refresh(&request.refresh_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.auth_service.sign_out(&auth.0).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Signed out successfully")))
}

#[get("/me")]
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.current_user(&auth.0).await?;
    Ok(HttpResponse::Ok().json(user))
}
