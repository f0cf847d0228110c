use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Password,
    Google,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn with_password(email: &str, display_name: &str, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            display_name: display_name.to_string(),
            password_hash: Some(password_hash),
            google_id: None,
            avatar_url: None,
            auth_provider: AuthProvider::Password,
            role: UserRole::User,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    pub fn from_google(
        google_id: String,
        email: String,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        let email = email.to_lowercase();
        let display_name = display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_display_name(&email));

        User {
            id: Uuid::new_v4().to_string(),
            email,
            display_name,
            password_hash: None,
            google_id: Some(google_id),
            avatar_url,
            auth_provider: AuthProvider::Google,
            role: UserRole::User,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    /// Name shown on attempts and the leaderboard.
    pub fn public_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

/// Local part of an email address, used when no display name is given.
pub fn default_display_name(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("Anonymous User")
        .to_string()
}

#[cfg(test)]
impl User {
    pub fn test_user(email: &str) -> Self {
        User::with_password(email, &default_display_name(email), "not-a-real-hash".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_user_creation() {
        let user = User::with_password("Jane@Example.com", "Jane", "hash".into());
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.auth_provider, AuthProvider::Password);
        assert_eq!(user.role, UserRole::User);
        assert!(Uuid::parse_str(&user.id).is_ok());
    }

    #[test]
    fn test_google_user_falls_back_to_email_local_part() {
        let user = User::from_google("g-1".into(), "sam@example.com".into(), None, None);
        assert_eq!(user.display_name, "sam");
        assert_eq!(user.google_id.as_deref(), Some("g-1"));
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn test_default_display_name_without_local_part() {
        assert_eq!(default_display_name("@example.com"), "Anonymous User");
    }

    #[test]
    fn test_password_hash_is_not_serialized_when_absent() {
        let user = User::from_google("g-2".into(), "a@b.co".into(), Some("A".into()), None);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["auth_provider"], "google");
    }
}
