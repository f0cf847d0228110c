use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{Database, REFRESH_TOKENS_COLLECTION},
    errors::AppResult,
    models::domain::RefreshToken,
};

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken>;

    /// Revoke a live token and hand back its record, in one step. Returns
    /// `None` when the token is unknown, already redeemed, revoked or
    /// expired, so each refresh token can be exchanged at most once.
    async fn redeem(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64>;
    async fn delete_expired(&self) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoRefreshTokenRepository {
    collection: Collection<RefreshToken>,
}

impl MongoRefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.get_collection(REFRESH_TOKENS_COLLECTION),
        }
    }
}

/// Dates are stored in chrono's RFC 3339 form, which orders lexically.
fn now_bson() -> AppResult<Bson> {
    Ok(to_bson(&Utc::now())?)
}

/// Matches only a token that can still be exchanged.
fn redeemable_filter(token_hash: &str, now: Bson) -> Document {
    doc! {
        "token_hash": token_hash,
        "revoked": false,
        "expires_at": { "$gt": now },
    }
}

fn revoke_update(now: Bson) -> Document {
    doc! { "$set": { "revoked": true, "revoked_at": now } }
}

#[async_trait]
impl RefreshTokenRepository for MongoRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        self.collection.insert_one(&token).await?;
        Ok(token)
    }

    async fn redeem(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let now = now_bson()?;
        let redeemed = self
            .collection
            .find_one_and_update(redeemable_filter(token_hash, now.clone()), revoke_update(now))
            .await?;

        if redeemed.is_none() {
            log::warn!("Refresh token presented again or after revocation");
        }
        Ok(redeemed)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "user_id": user_id, "revoked": false },
                revoke_update(now_bson()?),
            )
            .await?;

        Ok(result.modified_count)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lt": now_bson()? } })
            .await?;

        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let indexes = [
            ("token_hash_unique", doc! { "token_hash": 1 }, true),
            ("id_unique", doc! { "id": 1 }, true),
            ("user_revoked", doc! { "user_id": 1, "revoked": 1 }, false),
            ("expires_at", doc! { "expires_at": 1 }, false),
        ];

        for (name, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(unique)
                        .build(),
                )
                .build();
            self.collection.create_index(model).await?;
        }

        log::info!("Successfully created indexes for refresh_tokens collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeemable_filter_excludes_revoked_and_expired() {
        let now = Bson::String("2026-01-01T00:00:00Z".to_string());
        let filter = redeemable_filter("abc", now.clone());

        assert_eq!(filter.get_str("token_hash").unwrap(), "abc");
        assert!(!filter.get_bool("revoked").unwrap());
        assert_eq!(
            filter.get_document("expires_at").unwrap().get("$gt"),
            Some(&now)
        );
    }

    #[test]
    fn test_revoke_update_stamps_revocation() {
        let now = Bson::String("2026-01-01T00:00:00Z".to_string());
        let update = revoke_update(now.clone());
        let set = update.get_document("$set").unwrap();

        assert!(set.get_bool("revoked").unwrap());
        assert_eq!(set.get("revoked_at"), Some(&now));
    }
}
