use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{
        google::GoogleOAuthClient,
        password::{hash_password, verify_password},
        Claims, JwtService,
    },
    errors::{AppError, AppResult},
    models::{
        domain::{
            refresh_token::hash_token,
            user::default_display_name,
            User,
        },
        dto::{
            request::{GoogleAuthorizeParams, GoogleCallbackParams, LoginRequest, RegisterRequest},
            response::{AuthResponse, GoogleAuthorizeResponse, RefreshTokenResponse, UserDto},
        },
    },
    repositories::{RefreshTokenRepository, UserRepository},
};

pub const EMAIL_IN_USE: &str = "An account with this email already exists.";
pub const UNKNOWN_EMAIL: &str = "No account found with this email address.";
pub const WRONG_PASSWORD: &str = "Incorrect password. Please try again.";
pub const GOOGLE_ONLY_ACCOUNT: &str =
    "This account uses Google sign-in. Please continue with Google.";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt: Arc<JwtService>,
    google: Arc<dyn GoogleOAuthClient>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt: Arc<JwtService>,
        google: Arc<dyn GoogleOAuthClient>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt,
            google,
        }
    }

    /// Access token plus a stored, rotatable refresh token.
    async fn issue_tokens(&self, user: &User) -> AppResult<(String, String)> {
        let token = self.jwt.issue_access_token(user)?;
        let refresh = self.jwt.issue_refresh_token(&user.id)?;

        self.refresh_tokens.create(refresh.record).await?;

        Ok((token, refresh.token))
    }

    async fn auth_response(&self, user: User, message: &str) -> AppResult<AuthResponse> {
        let (token, refresh_token) = self.issue_tokens(&user).await?;
        Ok(AuthResponse {
            token,
            refresh_token,
            user: UserDto::from(user),
            message: message.to_string(),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists(EMAIL_IN_USE.to_string()));
        }

        let display_name = request
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(&email));

        let password_hash = hash_password(&request.password).await?;
        let mut user = User::with_password(&email, &display_name, password_hash);
        user.last_login_at = Some(chrono::Utc::now());
        let user = self.users.create(user).await?;

        log::info!("Registered new user {}", user.id);
        self.auth_response(user, "Account created successfully!").await
    }

    pub async fn sign_in(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let mut user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(UNKNOWN_EMAIL.to_string()))?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized(GOOGLE_ONLY_ACCOUNT.to_string()))?;

        if !verify_password(&request.password, hash).await {
            log::warn!("Failed sign-in attempt for user {}", user.id);
            return Err(AppError::Unauthorized(WRONG_PASSWORD.to_string()));
        }

        user.last_login_at = Some(chrono::Utc::now());
        let user = self.users.update(user).await?;

        self.auth_response(user, "Signed in successfully!").await
    }

    pub fn google_authorize_url(
        &self,
        params: GoogleAuthorizeParams,
    ) -> AppResult<GoogleAuthorizeResponse> {
        let url = self.google.authorize_url(params.state, params.redirect_uri)?;
        Ok(GoogleAuthorizeResponse { url })
    }

    pub async fn google_callback(&self, params: GoogleCallbackParams) -> AppResult<AuthResponse> {
        if let Some(error) = params.error {
            let message = if error == "access_denied" {
                "Sign-in was cancelled.".to_string()
            } else {
                format!("Google sign-in failed: {}", error)
            };
            return Err(AppError::Unauthorized(message));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

        let profile = self.google.fetch_profile(&code, params.redirect_uri).await?;
        let now = chrono::Utc::now();

        let user = match self.users.find_by_google_id(&profile.sub).await? {
            Some(mut user) => {
                user.last_login_at = Some(now);
                if user.avatar_url.is_none() {
                    user.avatar_url = profile.picture;
                }
                self.users.update(user).await?
            }
            None if !profile.email_verified => {
                log::warn!("Refusing Google sign-in with unverified email for {}", profile.sub);
                return Err(AppError::Unauthorized(
                    "Your Google email address is not verified.".to_string(),
                ));
            }
            None => match self.users.find_by_email(&profile.email).await? {
                Some(mut existing) => {
                    log::info!("Linking Google account to existing user {}", existing.id);
                    existing.google_id = Some(profile.sub);
                    existing.last_login_at = Some(now);
                    if existing.avatar_url.is_none() {
                        existing.avatar_url = profile.picture;
                    }
                    self.users.update(existing).await?
                }
                None => {
                    let mut user =
                        User::from_google(profile.sub, profile.email, profile.name, profile.picture);
                    user.last_login_at = Some(now);
                    self.users.create(user).await?
                }
            },
        };

        self.auth_response(user, "Signed in with Google successfully!").await
    }

    /// Exchange a refresh token for a new pair. The stored record is redeemed
    /// atomically, so a token that has already been used is refused.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshTokenResponse> {
        let claims = self.jwt.verify_refresh_token(refresh_token)?;

        let redeemed = self
            .refresh_tokens
            .redeem(&hash_token(refresh_token))
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("Refresh token has been revoked or expired".to_string())
            })?;

        if redeemed.id != claims.jti || redeemed.user_id != claims.sub {
            log::warn!("Refresh token record {} does not match its claims", redeemed.id);
            return Err(AppError::Unauthorized("Refresh token not recognized".to_string()));
        }

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("User associated with refresh token not found".to_string())
            })?;

        let (token, refresh_token) = self.issue_tokens(&user).await?;

        log::info!("Token refreshed successfully for user: {}", user.id);
        Ok(RefreshTokenResponse {
            token,
            refresh_token,
        })
    }

    /// Revokes every refresh token of the user.
    pub async fn sign_out(&self, claims: &Claims) -> AppResult<u64> {
        let revoked = self.refresh_tokens.revoke_all_for_user(&claims.sub).await?;
        log::info!("User {} signed out, {} refresh tokens revoked", claims.sub, revoked);
        Ok(revoked)
    }

    pub async fn current_user(&self, claims: &Claims) -> AppResult<UserDto> {
        self.find_user(&claims.sub).await.map(UserDto::from)
    }

    pub async fn find_user(&self, user_id: &str) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))
    }
}
