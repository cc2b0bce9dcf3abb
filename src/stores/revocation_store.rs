use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::errors::InternalError;
use crate::types::db::revocation_entry;
use crate::types::internal::NewRevocation;

/// Durable set of revoked token ids
///
/// Entries are never updated. An entry may be pruned once the token it
/// revokes has expired, since signature validation rejects the token anyway.
pub struct RevocationStore;

impl RevocationStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_jti(
        &self,
        conn: &impl ConnectionTrait,
        jti: &str,
    ) -> Result<Option<revocation_entry::Model>, InternalError> {
        revocation_entry::Entity::find()
            .filter(revocation_entry::Column::Jti.eq(jti))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_revocation_by_jti", e))
    }

    pub async fn is_revoked(
        &self,
        conn: &impl ConnectionTrait,
        jti: &str,
    ) -> Result<bool, InternalError> {
        Ok(self.find_by_jti(conn, jti).await?.is_some())
    }

    /// Insert a revocation unless one already exists for the jti
    ///
    /// The unique constraint on `jti` makes this the single atomic point at
    /// which a token becomes revoked: of any number of concurrent callers,
    /// exactly one observes `created == true`.
    ///
    /// # Arguments
    /// * `conn` - Connection or transaction
    /// * `id` - Row id for a newly created entry
    /// * `entry` - What to revoke
    /// * `revoked_at` - Unix timestamp of the revocation
    ///
    /// # Returns
    /// * `Ok((entry, created))` - The stored entry and whether this call created it
    pub async fn insert_if_absent(
        &self,
        conn: &impl ConnectionTrait,
        id: String,
        entry: &NewRevocation,
        revoked_at: i64,
    ) -> Result<(revocation_entry::Model, bool), InternalError> {
        let active = revocation_entry::ActiveModel {
            id: Set(id),
            jti: Set(entry.jti.clone()),
            token_type: Set(entry.token_type),
            user_id: Set(entry.user_id.clone()),
            expires_at: Set(entry.expires_at),
            revoked_at: Set(revoked_at),
            reason: Set(entry.reason.clone()),
        };

        let inserted = revocation_entry::Entity::insert(active)
            .on_conflict(
                OnConflict::column(revocation_entry::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| InternalError::database("insert_revocation", e))?;

        let stored = self.find_by_jti(conn, &entry.jti).await?.ok_or_else(|| {
            InternalError::database(
                "insert_revocation",
                sea_orm::DbErr::RecordNotFound(format!("revocation for jti {}", entry.jti)),
            )
        })?;

        Ok((stored, inserted == 1))
    }

    /// Delete entries whose token expiry has passed
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of entries removed
    pub async fn prune_expired(
        &self,
        conn: &impl ConnectionTrait,
        now: i64,
    ) -> Result<u64, InternalError> {
        let result = revocation_entry::Entity::delete_many()
            .filter(revocation_entry::Column::ExpiresAt.lte(now))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("prune_revocations", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for RevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;
    use crate::types::internal::TokenType;

    fn revocation(jti: &str, expires_at: i64) -> NewRevocation {
        NewRevocation {
            jti: jti.to_string(),
            token_type: TokenType::Refresh,
            user_id: None,
            expires_at,
            reason: Some("rotated".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_creates_once() {
        let db = setup_test_db().await;
        let store = RevocationStore::new();

        let (first, created) = store
            .insert_if_absent(&db, "id-1".to_string(), &revocation("jti-1", 2_000), 1_000)
            .await
            .unwrap();
        assert!(created);
        assert_eq!(first.jti, "jti-1");
        assert_eq!(first.reason.as_deref(), Some("rotated"));

        let mut again = revocation("jti-1", 2_000);
        again.reason = Some("logout".to_string());
        let (second, created) = store
            .insert_if_absent(&db, "id-2".to_string(), &again, 1_500)
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(second, first);

        let count = revocation_entry::Entity::find()
            .filter(revocation_entry::Column::Jti.eq("jti-1"))
            .all(&db)
            .await
            .unwrap()
            .len();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_is_revoked() {
        let db = setup_test_db().await;
        let store = RevocationStore::new();

        assert!(!store.is_revoked(&db, "jti-1").await.unwrap());

        store
            .insert_if_absent(&db, "id-1".to_string(), &revocation("jti-1", 2_000), 1_000)
            .await
            .unwrap();

        assert!(store.is_revoked(&db, "jti-1").await.unwrap());
        assert!(!store.is_revoked(&db, "jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_removes_only_expired_entries() {
        let db = setup_test_db().await;
        let store = RevocationStore::new();

        store
            .insert_if_absent(&db, "id-1".to_string(), &revocation("expired", 1_000), 900)
            .await
            .unwrap();
        store
            .insert_if_absent(&db, "id-2".to_string(), &revocation("boundary", 1_500), 900)
            .await
            .unwrap();
        store
            .insert_if_absent(&db, "id-3".to_string(), &revocation("live", 5_000), 900)
            .await
            .unwrap();

        let removed = store.prune_expired(&db, 1_500).await.unwrap();

        assert_eq!(removed, 2);
        assert!(!store.is_revoked(&db, "expired").await.unwrap());
        assert!(!store.is_revoked(&db, "boundary").await.unwrap());
        assert!(store.is_revoked(&db, "live").await.unwrap());
    }
}
