use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::errors::InternalError;
use crate::types::db::{AuthProvider, social_account};
use crate::types::internal::{ProviderProfile, normalize_email};

/// Links between users and external identity providers
pub struct SocialAccountStore;

impl SocialAccountStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_provider_identity(
        &self,
        conn: &impl ConnectionTrait,
        provider: AuthProvider,
        provider_id: &str,
    ) -> Result<Option<social_account::Model>, InternalError> {
        social_account::Entity::find()
            .filter(social_account::Column::Provider.eq(provider))
            .filter(social_account::Column::ProviderId.eq(provider_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_social_account", e))
    }

    /// Create a link
    ///
    /// Fails with a unique-constraint database error if the provider identity
    /// is already linked; see `InternalError::is_unique_violation`.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        id: String,
        user_id: &str,
        provider: AuthProvider,
        profile: &ProviderProfile,
        now: i64,
    ) -> Result<social_account::Model, InternalError> {
        let active = social_account::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            provider: Set(provider),
            provider_id: Set(profile.provider_id.clone()),
            email: Set(Some(normalize_email(&profile.email))),
            name: Set(profile.name.clone()),
            given_name: Set(profile.given_name.clone()),
            family_name: Set(profile.family_name.clone()),
            picture: Set(profile.picture.clone()),
            verified: Set(profile.email_verified),
            created_at: Set(now),
            updated_at: Set(now),
            last_used: Set(now),
        };

        active
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_social_account", e))
    }

    /// Record a successful login through an existing link
    ///
    /// Refreshes `last_used` and the cached profile. `verified` only ever moves
    /// from false to true.
    pub async fn record_use(
        &self,
        conn: &impl ConnectionTrait,
        existing: social_account::Model,
        profile: &ProviderProfile,
        now: i64,
    ) -> Result<social_account::Model, InternalError> {
        let verified = existing.verified || profile.email_verified;
        let name = profile.name.clone().or_else(|| existing.name.clone());
        let given_name = profile.given_name.clone().or_else(|| existing.given_name.clone());
        let family_name = profile.family_name.clone().or_else(|| existing.family_name.clone());
        let picture = profile.picture.clone().or_else(|| existing.picture.clone());

        let mut active: social_account::ActiveModel = existing.into();
        active.email = Set(Some(normalize_email(&profile.email)));
        active.name = Set(name);
        active.given_name = Set(given_name);
        active.family_name = Set(family_name);
        active.picture = Set(picture);
        active.verified = Set(verified);
        active.last_used = Set(now);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("record_social_account_use", e))
    }

    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<social_account::Model>, InternalError> {
        social_account::Entity::find()
            .filter(social_account::Column::UserId.eq(user_id))
            .order_by_asc(social_account::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_social_accounts", e))
    }

    pub async fn delete_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = social_account::Entity::delete_many()
            .filter(social_account::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_social_accounts", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for SocialAccountStore {
    fn default() -> Self {
        Self::new()
    }
}
