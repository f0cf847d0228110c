use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Server-side record of an issued refresh token. The id is the token's
/// `jti`; only a digest of the signed token is kept.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RefreshToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn new(jti: &str, user_id: &str, raw_token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: jti.to_string(),
            user_id: user_id.to_string(),
            token_hash: hash_token(raw_token),
            expires_at,
            created_at: Utc::now(),
            revoked: false,
            revoked_at: None,
        }
    }

    /// Redeemable: not revoked and not past expiry.
    pub fn is_valid(&self) -> bool {
        !self.revoked && self.expires_at > Utc::now()
    }

    pub fn revoke(&mut self) {
        self.revoked = true;
        self.revoked_at = Some(Utc::now());
    }
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token_expiring_in(hours: i64) -> RefreshToken {
        RefreshToken::new("jti-1", "user123", "raw-token", Utc::now() + Duration::hours(hours))
    }

    #[test]
    fn test_record_keeps_digest_and_jti() {
        let token = token_expiring_in(24);

        assert_eq!(token.id, "jti-1");
        assert_eq!(token.user_id, "user123");
        assert_eq!(token.token_hash, hash_token("raw-token"));
        assert_ne!(token.token_hash, "raw-token");
        assert!(token.is_valid());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        assert!(!token_expiring_in(-1).is_valid());
    }

    #[test]
    fn test_revoke_stamps_time() {
        let mut token = token_expiring_in(24);
        token.revoke();

        assert!(!token.is_valid());
        assert!(token.revoked_at.is_some());
    }

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hash = hash_token("my-secret-token");

        assert_eq!(hash, hash_token("my-secret-token"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token("other"));
    }
}
