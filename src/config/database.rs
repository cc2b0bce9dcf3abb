use migration::{IdentityMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::errors::InternalError;

/// Connect to the identity database
///
/// Does NOT run migrations - call `migrate_database()` separately.
///
/// # Arguments
/// * `database_url` - Any sea-orm connection URL
///
/// # Returns
/// * `Ok(DatabaseConnection)` - Connection established successfully
/// * `Err(InternalError)` - Connection failed
pub async fn connect_database(database_url: &str) -> Result<DatabaseConnection, InternalError> {
    let db = Database::connect(database_url)
        .await
        .map_err(|e| InternalError::database("connect_database", e))?;

    tracing::debug!("Connected to identity database: {}", database_url);

    Ok(db)
}

/// Run all pending migrations on the identity database
///
/// # Returns
/// * `Ok(())` - Migrations completed successfully
/// * `Err(InternalError)` - Migration failed
pub async fn migrate_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    IdentityMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Identity database migrations completed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn test_connect_and_migrate_in_memory() {
        let db = connect_database("sqlite::memory:").await.unwrap();
        migrate_database(&db).await.unwrap();

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'revocation_entries'",
            ))
            .await
            .unwrap()
            .unwrap();
        let n: i64 = row.try_get("", "n").unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = connect_database("sqlite::memory:").await.unwrap();
        migrate_database(&db).await.unwrap();

        assert!(migrate_database(&db).await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_url_is_a_database_error() {
        let result = connect_database("notadb://nowhere").await;

        assert!(matches!(result, Err(InternalError::Database(_))));
    }
}
