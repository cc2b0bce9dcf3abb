use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::errors::AuthError;
use crate::providers::IdentityProvider;
use crate::types::dto::{PhoneCodeSent, UserProfile};

/// Orchestrates the email-delivered verification code flow for phone binding
pub struct PhoneBindingCoordinator {
    db: DatabaseConnection,
    identity_provider: Arc<IdentityProvider>,
}

impl PhoneBindingCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            identity_provider: Arc::clone(&app_data.identity_provider),
        }
    }

    /// Email a verification code for binding `phone_number`
    ///
    /// Returns once the code is stored; delivery happens in the background.
    pub async fn send_code(&self, phone_number: &str, email: &str) -> Result<PhoneCodeSent, AuthError> {
        let stored = self
            .identity_provider
            .request_phone_binding(&self.db, phone_number, email)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(PhoneCodeSent {
            message: "Verification code sent".to_string(),
            expires_at: stored.expires_at,
        })
    }

    /// Redeem a code and bind the phone number to the email's user
    ///
    /// # Returns
    /// * `Ok(UserProfile)` - The user now owning the verified phone number
    /// * `Err(AuthError::InvalidOrExpiredCode)` - Wrong, used or expired code
    /// * `Err(AuthError::PhoneAlreadyBound)` - Phone owned by another user
    pub async fn verify_code(
        &self,
        email: &str,
        phone_number: &str,
        code: &str,
    ) -> Result<UserProfile, AuthError> {
        let user = self
            .identity_provider
            .redeem_phone_binding(&self.db, email, phone_number, code)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(UserProfile::from(user))
    }
}
