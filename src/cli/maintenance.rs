// Storage hygiene commands

use crate::app_data::AppData;

/// Delete revocation entries past their token's expiry, then used or expired codes
pub async fn prune(app_data: &AppData) -> Result<(), Box<dyn std::error::Error>> {
    let revocations = app_data
        .token_provider
        .prune_revocations(&app_data.db)
        .await
        .map_err(|e| format!("Failed to prune revocation entries: {}", e))?;

    let codes = app_data
        .identity_provider
        .prune_verification_codes(&app_data.db)
        .await
        .map_err(|e| format!("Failed to prune verification codes: {}", e))?;

    println!("Pruned {} revocation entries and {} verification codes.", revocations, codes);

    Ok(())
}
