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
                    .table(RevocationEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RevocationEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RevocationEntries::Jti)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RevocationEntries::TokenType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RevocationEntries::UserId).string().null())
                    .col(
                        ColumnDef::new(RevocationEntries::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RevocationEntries::RevokedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RevocationEntries::Reason).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revocation_entries_user_id")
                            .from(RevocationEntries::Table, RevocationEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Pruning deletes by expiry
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_revocation_entries_expires")
                    .table(RevocationEntries::Table)
                    .col(RevocationEntries::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RevocationEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RevocationEntries {
    Table,
    Id,
    Jti,
    TokenType,
    UserId,
    ExpiresAt,
    RevokedAt,
    Reason,
}
