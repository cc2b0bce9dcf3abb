use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, Condition, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder,
};

use crate::errors::InternalError;
use crate::types::db::verification_code;

/// Time-boxed one-time codes binding an email and a phone number
pub struct VerificationCodeStore;

impl VerificationCodeStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        phone_number: &str,
        code: &str,
        created_at: i64,
        expires_at: i64,
    ) -> Result<verification_code::Model, InternalError> {
        let active = verification_code::ActiveModel {
            id: NotSet,
            email: Set(email.to_string()),
            phone_number: Set(phone_number.to_string()),
            code: Set(code.to_string()),
            created_at: Set(created_at),
            expires_at: Set(expires_at),
            used_at: Set(None),
        };

        active
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_verification_code", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: i32,
    ) -> Result<Option<verification_code::Model>, InternalError> {
        verification_code::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_verification_code", e))
    }

    /// Newest unused, unexpired code matching the full (email, phone, code) triple
    ///
    /// Ties on `created_at` go to the larger id.
    pub async fn find_redeemable(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        phone_number: &str,
        code: &str,
        now: i64,
    ) -> Result<Option<verification_code::Model>, InternalError> {
        verification_code::Entity::find()
            .filter(verification_code::Column::Email.eq(email))
            .filter(verification_code::Column::PhoneNumber.eq(phone_number))
            .filter(verification_code::Column::Code.eq(code))
            .filter(verification_code::Column::UsedAt.is_null())
            .filter(verification_code::Column::ExpiresAt.gt(now))
            .order_by_desc(verification_code::Column::CreatedAt)
            .order_by_desc(verification_code::Column::Id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_redeemable_code", e))
    }

    /// Consume a code with a compare-and-set on `used_at`
    ///
    /// # Returns
    /// * `Ok(true)` - This call consumed the code
    /// * `Ok(false)` - The code was already used or has expired
    pub async fn mark_used(
        &self,
        conn: &impl ConnectionTrait,
        id: i32,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = verification_code::Entity::update_many()
            .col_expr(verification_code::Column::UsedAt, Expr::value(now))
            .filter(verification_code::Column::Id.eq(id))
            .filter(verification_code::Column::UsedAt.is_null())
            .filter(verification_code::Column::ExpiresAt.gt(now))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("mark_verification_code_used", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Delete codes that can never be redeemed again
    pub async fn prune(
        &self,
        conn: &impl ConnectionTrait,
        now: i64,
    ) -> Result<u64, InternalError> {
        let result = verification_code::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(verification_code::Column::ExpiresAt.lte(now))
                    .add(verification_code::Column::UsedAt.is_not_null()),
            )
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("prune_verification_codes", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for VerificationCodeStore {
    fn default() -> Self {
        Self::new()
    }
}
