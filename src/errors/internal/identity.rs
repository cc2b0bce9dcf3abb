use thiserror::Error;

use crate::types::db::AuthProvider;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User is disabled: {0}")]
    UserDisabled(String),

    #[error("Admin role required for user {0}")]
    AdminRequired(String),

    #[error("External identity {provider}:{provider_id} is linked to another user")]
    DuplicateExternalIdentity {
        provider: AuthProvider,
        provider_id: String,
    },

    #[error("Phone number {0} is already bound to another user")]
    PhoneAlreadyBound(String),

    #[error("Verification code is invalid, expired or already used")]
    InvalidOrExpiredCode,
}
