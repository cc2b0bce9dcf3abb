use crate::config::{AuthSettings, connect_database, migrate_database};

/// Run database migrations
///
/// Connects to the configured database and runs all pending migrations.
/// It does not initialize the full AppData structure, so no signing secret
/// is required.
pub async fn run_migrations(settings: &AuthSettings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let db = connect_database(settings.database_url()).await?;
    migrate_database(&db).await?;

    tracing::info!("All migrations completed successfully");

    Ok(())
}
