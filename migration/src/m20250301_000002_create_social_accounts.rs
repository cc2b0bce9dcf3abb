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
                    .table(SocialAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SocialAccounts::UserId).string().not_null())
                    .col(
                        ColumnDef::new(SocialAccounts::Provider)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::ProviderId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SocialAccounts::Email).string_len(255).null())
                    .col(ColumnDef::new(SocialAccounts::Name).string_len(255).null())
                    .col(ColumnDef::new(SocialAccounts::GivenName).string_len(100).null())
                    .col(ColumnDef::new(SocialAccounts::FamilyName).string_len(100).null())
                    .col(ColumnDef::new(SocialAccounts::Picture).string_len(500).null())
                    .col(
                        ColumnDef::new(SocialAccounts::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::LastUsed)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_accounts_user_id")
                            .from(SocialAccounts::Table, SocialAccounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One provider identity belongs to at most one user
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_social_accounts_provider_identity")
                    .table(SocialAccounts::Table)
                    .col(SocialAccounts::Provider)
                    .col(SocialAccounts::ProviderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_social_accounts_user_id")
                    .table(SocialAccounts::Table)
                    .col(SocialAccounts::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SocialAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SocialAccounts {
    Table,
    Id,
    UserId,
    Provider,
    ProviderId,
    Email,
    Name,
    GivenName,
    FamilyName,
    Picture,
    Verified,
    CreatedAt,
    UpdatedAt,
    LastUsed,
}
