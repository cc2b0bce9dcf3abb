use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::errors::InternalError;
use crate::types::db::phone_binding;

/// Phone numbers bound to users; the phone number is the primary key
pub struct PhoneBindingStore;

impl PhoneBindingStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_phone(
        &self,
        conn: &impl ConnectionTrait,
        phone_number: &str,
    ) -> Result<Option<phone_binding::Model>, InternalError> {
        phone_binding::Entity::find_by_id(phone_number.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_phone_binding", e))
    }

    /// Create a binding; a second binding for the same phone is a unique violation
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        phone_number: &str,
        user_id: &str,
        verified: bool,
        now: i64,
    ) -> Result<phone_binding::Model, InternalError> {
        let active = phone_binding::ActiveModel {
            phone_number: Set(phone_number.to_string()),
            user_id: Set(user_id.to_string()),
            verified: Set(verified),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_phone_binding", e))
    }

    pub async fn mark_verified(
        &self,
        conn: &impl ConnectionTrait,
        existing: phone_binding::Model,
        now: i64,
    ) -> Result<phone_binding::Model, InternalError> {
        if existing.verified {
            return Ok(existing);
        }

        let mut active: phone_binding::ActiveModel = existing.into();
        active.verified = Set(true);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("mark_phone_binding_verified", e))
    }

    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<phone_binding::Model>, InternalError> {
        phone_binding::Entity::find()
            .filter(phone_binding::Column::UserId.eq(user_id))
            .order_by_asc(phone_binding::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_phone_bindings", e))
    }

    pub async fn delete_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = phone_binding::Entity::delete_many()
            .filter(phone_binding::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_phone_bindings", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for PhoneBindingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::UserStore;
    use crate::test::utils::setup_test_db;

    const PHONE: &str = "3413413413";

    async fn seed_users(db: &sea_orm::DatabaseConnection) {
        let users = UserStore::new();
        users.insert_if_absent(db, "user-1".to_string(), "a@x.com", 1_000).await.unwrap();
        users.insert_if_absent(db, "user-2".to_string(), "b@x.com", 1_000).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = setup_test_db().await;
        seed_users(&db).await;
        let store = PhoneBindingStore::new();

        store.insert(&db, PHONE, "user-1", true, 1_000).await.unwrap();

        let found = store.find_by_phone(&db, PHONE).await.unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
        assert!(found.verified);
        assert!(store.find_by_phone(&db, "3410000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_binding_for_phone_is_unique_violation() {
        let db = setup_test_db().await;
        seed_users(&db).await;
        let store = PhoneBindingStore::new();
        store.insert(&db, PHONE, "user-1", true, 1_000).await.unwrap();

        let result = store.insert(&db, PHONE, "user-2", true, 1_100).await;

        match result {
            Err(e) => assert!(e.is_unique_violation()),
            Ok(_) => panic!("Expected unique violation"),
        }
        let found = store.find_by_phone(&db, PHONE).await.unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let db = setup_test_db().await;
        seed_users(&db).await;
        let store = PhoneBindingStore::new();
        let binding = store.insert(&db, PHONE, "user-1", false, 1_000).await.unwrap();

        let verified = store.mark_verified(&db, binding, 2_000).await.unwrap();

        assert!(verified.verified);
        assert_eq!(verified.updated_at, 2_000);
    }

    #[tokio::test]
    async fn test_bindings_removed_with_user() {
        let db = setup_test_db().await;
        seed_users(&db).await;
        let store = PhoneBindingStore::new();
        store.insert(&db, PHONE, "user-1", true, 1_000).await.unwrap();

        UserStore::new().delete(&db, "user-1").await.unwrap();

        assert!(store.find_by_phone(&db, PHONE).await.unwrap().is_none());
    }
}
