use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, RefreshClaims, REFRESH_TOKEN_TYPE},
    errors::{AppError, AppResult},
    models::domain::{RefreshToken, User},
};

/// A signed refresh token and the record that makes it revocable.
pub struct IssuedRefreshToken {
    pub token: String,
    pub record: RefreshToken,
}

/// Signs and verifies the two token kinds. Access tokens carry the profile
/// claims; refresh tokens carry only the user id and a `jti` that names
/// their stored record.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_hours: i64,
    refresh_ttl_hours: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, access_ttl_hours: i64, refresh_ttl_hours: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl_hours,
            refresh_ttl_hours,
        }
    }

    pub fn issue_access_token(&self, user: &User) -> AppResult<String> {
        let claims = Claims::new(user, self.access_ttl_hours);
        self.sign(&claims, "access token")
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> AppResult<IssuedRefreshToken> {
        let claims = RefreshClaims::new(user_id, self.refresh_ttl_hours);
        let token = self.sign(&claims, "refresh token")?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| AppError::InternalError("Refresh expiry out of range".to_string()))?;
        let record = RefreshToken::new(&claims.jti, user_id, &token, expires_at);

        Ok(IssuedRefreshToken { token, record })
    }

    /// Signature, expiry, token type and `jti` shape. Whether the token is
    /// still redeemable is decided by its stored record.
    pub fn verify_refresh_token(&self, token: &str) -> AppResult<RefreshClaims> {
        let claims = decode::<RefreshClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| refresh_error(e.kind()))?;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(AppError::Unauthorized(
                "Token is not a refresh token".to_string(),
            ));
        }
        if Uuid::parse_str(&claims.jti).is_err() {
            return Err(AppError::Unauthorized(
                "Refresh token has no valid id".to_string(),
            ));
        }

        Ok(claims)
    }

    fn sign<T: serde::Serialize>(&self, claims: &T, what: &str) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign {}: {}", what, e)))
    }
}

fn refresh_error(kind: &ErrorKind) -> AppError {
    let message = match kind {
        ErrorKind::ExpiredSignature => "Refresh token has expired".to_string(),
        ErrorKind::InvalidSignature => "Refresh token signature is invalid".to_string(),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            "Invalid refresh token format".to_string()
        }
        other => format!("Refresh token validation failed: {:?}", other),
    };
    AppError::Unauthorized(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn service() -> JwtService {
        JwtService::new(&Config::test_config().jwt_secret, 1, 168)
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = service();
        let user = User::test_user("john@example.com");

        let claims = jwt
            .verify_access_token(&jwt.issue_access_token(&user).unwrap())
            .unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.display_name, "john");
    }

    #[test]
    fn test_garbage_access_token_is_rejected() {
        assert!(matches!(
            service().verify_access_token("invalid.token.here"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_refresh_record_matches_claims() {
        let jwt = service();
        let issued = jwt.issue_refresh_token("user-1").unwrap();
        let claims = jwt.verify_refresh_token(&issued.token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(issued.record.id, claims.jti);
        assert_eq!(issued.record.user_id, "user-1");
        assert_eq!(issued.record.expires_at.timestamp() as usize, claims.exp);
        assert_eq!(
            issued.record.token_hash,
            crate::models::domain::refresh_token::hash_token(&issued.token)
        );
    }

    #[test]
    fn test_refresh_tokens_get_distinct_ids() {
        let jwt = service();
        let first = jwt.issue_refresh_token("user-1").unwrap();
        let second = jwt.issue_refresh_token("user-1").unwrap();

        assert_ne!(first.record.id, second.record.id);
        assert_ne!(first.record.token_hash, second.record.token_hash);
    }

    #[test]
    fn test_malformed_refresh_token_message() {
        match service().verify_refresh_token("invalid.token.here") {
            Err(AppError::Unauthorized(msg)) => assert!(msg.starts_with("Refresh token") || msg.starts_with("Invalid refresh token")),
            _ => panic!("Expected Unauthorized error"),
        }
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let jwt = service();
        let access = jwt
            .issue_access_token(&User::test_user("a@example.com"))
            .unwrap();
        assert!(jwt.verify_refresh_token(&access).is_err());
    }

    #[test]
    fn test_refresh_token_without_uuid_jti_is_rejected() {
        let jwt = service();
        let mut claims = RefreshClaims::new("user-1", 1);
        claims.jti = "not-a-uuid".to_string();
        let token = jwt.sign(&claims, "refresh token").unwrap();

        assert!(matches!(
            jwt.verify_refresh_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }
}
