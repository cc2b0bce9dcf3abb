use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};

use crate::errors::InternalError;
use crate::errors::internal::IdentityError;
use crate::types::db::{UserRole, user};
use crate::types::internal::{ProviderProfile, normalize_email};

pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    /// Look up a user by email (case-insensitive)
    pub async fn find_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    /// Insert a user unless one with the same email already exists
    ///
    /// Concurrent callers with the same email all end up with the same row.
    ///
    /// # Returns
    /// * `Ok((user, created))` - The stored user and whether this call created it
    pub async fn insert_if_absent(
        &self,
        conn: &impl ConnectionTrait,
        id: String,
        email: &str,
        now: i64,
    ) -> Result<(user::Model, bool), InternalError> {
        let email = normalize_email(email);
        let active = user::ActiveModel {
            id: Set(id),
            email: Set(email.clone()),
            full_name: Set(None),
            given_name: Set(None),
            family_name: Set(None),
            picture: Set(None),
            disabled: Set(false),
            role: Set(UserRole::User),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = user::Entity::insert(active)
            .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
            .exec_without_returning(conn)
            .await
            .map_err(|e| InternalError::database("insert_user", e))?;

        let stored = self
            .find_by_email(conn, &email)
            .await?
            .ok_or_else(|| InternalError::Identity(IdentityError::UserNotFound(email.clone())))?;

        Ok((stored, inserted == 1))
    }

    /// Fill in empty profile fields from a provider profile
    ///
    /// Fields already set on the user are kept; empty ones adopt the incoming value.
    pub async fn backfill_profile(
        &self,
        conn: &impl ConnectionTrait,
        existing: user::Model,
        profile: &ProviderProfile,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let full_name = existing.full_name.clone().or_else(|| profile.name.clone());
        let given_name = existing.given_name.clone().or_else(|| profile.given_name.clone());
        let family_name = existing.family_name.clone().or_else(|| profile.family_name.clone());
        let picture = existing.picture.clone().or_else(|| profile.picture.clone());

        let unchanged = full_name == existing.full_name
            && given_name == existing.given_name
            && family_name == existing.family_name
            && picture == existing.picture;
        if unchanged {
            return Ok(existing);
        }

        let mut active: user::ActiveModel = existing.into();
        active.full_name = Set(full_name);
        active.given_name = Set(given_name);
        active.family_name = Set(family_name);
        active.picture = Set(picture);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("backfill_user_profile", e))
    }

    pub async fn set_role(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        role: UserRole,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let existing = self.require(conn, id).await?;

        let mut active: user::ActiveModel = existing.into();
        active.role = Set(role);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_user_role", e))
    }

    pub async fn set_disabled(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        disabled: bool,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let existing = self.require(conn, id).await?;

        let mut active: user::ActiveModel = existing.into();
        active.disabled = Set(disabled);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_user_disabled", e))
    }

    /// Delete a user row
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows removed (0 if the user did not exist)
    pub async fn delete(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<u64, InternalError> {
        let result = user::Entity::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user", e))?;

        Ok(result.rows_affected)
    }

    /// Load a user by id, failing with `UserNotFound` when absent
    pub async fn require(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<user::Model, InternalError> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| InternalError::Identity(IdentityError::UserNotFound(id.to_string())))
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
