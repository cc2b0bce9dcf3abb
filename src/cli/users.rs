// User administration commands

use std::io::{self, Write};

use crate::app_data::AppData;
use crate::types::db::user;

async fn require_user(app_data: &AppData, email: &str) -> Result<user::Model, Box<dyn std::error::Error>> {
    let user = app_data
        .identity_provider
        .find_by_email(&app_data.db, email)
        .await
        .map_err(|e| format!("Failed to look up user: {}", e))?;

    match user {
        Some(user) => Ok(user),
        None => {
            println!("❌ Error: No user with email {}.", email);
            Err("User not found".into())
        }
    }
}

/// Issue a token pair for an existing active user
pub async fn issue_tokens(app_data: &AppData, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user = app_data
        .identity_provider
        .require_active_user(&app_data.db, email)
        .await
        .map_err(|e| format!("Cannot issue tokens: {}", e))?;

    let pair = app_data
        .token_provider
        .issue_token_pair(&user.email)
        .map_err(|e| format!("Failed to issue tokens: {}", e))?;

    tracing::info!(user_id = %user.id, "Tokens issued from CLI");

    println!("access_token:  {}", pair.access_token);
    println!("refresh_token: {}", pair.refresh_token);
    println!("token_type:    {}", pair.token_type);

    Ok(())
}

pub async fn promote(app_data: &AppData, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user = require_user(app_data, email).await?;

    if user.is_admin() {
        println!("ℹ️  {} is already an admin.", user.email);
        return Ok(());
    }

    app_data
        .identity_provider
        .promote_to_admin(&app_data.db, &user.id)
        .await
        .map_err(|e| format!("Failed to promote user: {}", e))?;

    println!("✅ {} is now an admin.", user.email);
    Ok(())
}

pub async fn set_disabled(
    app_data: &AppData,
    email: &str,
    disabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = require_user(app_data, email).await?;

    app_data
        .identity_provider
        .set_disabled(&app_data.db, &user.id, disabled)
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    if disabled {
        println!("✅ {} disabled. Outstanding tokens stop working at the next check.", user.email);
    } else {
        println!("✅ {} enabled.", user.email);
    }
    Ok(())
}

/// Delete a user after an interactive confirmation (unless `assume_yes`)
pub async fn delete_user(
    app_data: &AppData,
    email: &str,
    assume_yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = require_user(app_data, email).await?;

    if !assume_yes {
        println!("⚠️  WARNING: You are about to delete {} ({}).", user.email, user.id);
        print!("   Are you sure? (yes/no): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "yes" {
            println!("❌ Deletion cancelled.");
            return Ok(());
        }
    }

    app_data
        .identity_provider
        .delete_user(&app_data.db, &user.id)
        .await
        .map_err(|e| format!("Failed to delete user: {}", e))?;

    println!("✅ {} deleted.", user.email);
    Ok(())
}
