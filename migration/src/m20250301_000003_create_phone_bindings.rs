use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhoneBindings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhoneBindings::PhoneNumber)
                            .string_len(20)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhoneBindings::UserId).string().not_null())
                    .col(
                        ColumnDef::new(PhoneBindings::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PhoneBindings::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhoneBindings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phone_bindings_user_id")
                            .from(PhoneBindings::Table, PhoneBindings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_phone_bindings_user_id")
                    .table(PhoneBindings::Table)
                    .col(PhoneBindings::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PhoneBindings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PhoneBindings {
    Table,
    PhoneNumber,
    UserId,
    Verified,
    CreatedAt,
    UpdatedAt,
}
