pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_social_accounts;
mod m20250301_000003_create_phone_bindings;
mod m20250301_000004_create_verification_codes;
mod m20250301_000005_create_revocation_entries;

pub struct IdentityMigrator;

#[async_trait::async_trait]
impl MigratorTrait for IdentityMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_social_accounts::Migration),
            Box::new(m20250301_000003_create_phone_bindings::Migration),
            Box::new(m20250301_000004_create_verification_codes::Migration),
            Box::new(m20250301_000005_create_revocation_entries::Migration),
        ]
    }
}
