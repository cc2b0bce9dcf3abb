// CLI module for administrative operations requiring server access

pub mod maintenance;
pub mod migrate;
pub mod users;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Identity backend CLI for administrative operations
#[derive(Parser)]
#[command(name = "identity")]
#[command(about = "Identity and token lifecycle administration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate,

    /// Delete expired revocation entries and spent verification codes
    Prune,

    /// Issue an access/refresh token pair for an active user
    IssueTokens {
        /// User email
        #[arg(long)]
        email: String,
    },

    /// Grant the admin role to a user
    Promote {
        #[arg(long)]
        email: String,
    },

    /// Disable (or re-enable) a user
    Disable {
        #[arg(long)]
        email: String,

        /// Re-enable the user instead
        #[arg(long)]
        enable: bool,
    },

    /// Delete a user together with its linked accounts and phone bindings
    DeleteUser {
        #[arg(long)]
        email: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Execute CLI command
///
/// Routes the parsed CLI command to the appropriate handler function.
/// `Migrate` is handled by main before AppData exists.
///
/// # Arguments
/// * `command` - Parsed CLI command
/// * `app_data` - Application data containing the connection and providers
pub async fn execute_command(
    command: Commands,
    app_data: &AppData,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Migrate => {
            tracing::info!("Migrations already applied at startup");
        }
        Commands::Prune => {
            maintenance::prune(app_data).await?;
        }
        Commands::IssueTokens { email } => {
            users::issue_tokens(app_data, &email).await?;
        }
        Commands::Promote { email } => {
            users::promote(app_data, &email).await?;
        }
        Commands::Disable { email, enable } => {
            users::set_disabled(app_data, &email, !enable).await?;
        }
        Commands::DeleteUser { email, yes } => {
            users::delete_user(app_data, &email, yes).await?;
        }
    }

    Ok(())
}
