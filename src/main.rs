use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use identity_backend::app_data::AppData;
use identity_backend::cli::{self, Cli, Commands};
use identity_backend::config::{AuthSettings, connect_database, init_logging, migrate_database};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = AuthSettings::from_env()?;

    if let Commands::Migrate = cli.command {
        return cli::migrate::run_migrations(&settings).await;
    }

    let db = connect_database(settings.database_url()).await?;
    migrate_database(&db).await?;

    let app_data = Arc::new(AppData::init(db, settings).await?);

    cli::execute_command(cli.command, &app_data).await
}
