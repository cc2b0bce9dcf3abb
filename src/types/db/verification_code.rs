use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    pub phone_number: String,
    pub code: String,
    pub created_at: i64,
    #[sea_orm(indexed)]
    pub expires_at: i64,
    pub used_at: Option<i64>,
}

impl Model {
    /// A code is redeemable while unused and strictly before its expiry
    pub fn is_redeemable(&self, now: i64) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
