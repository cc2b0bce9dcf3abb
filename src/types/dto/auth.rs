use serde::{Deserialize, Serialize};

use crate::types::db::{UserRole, user};

/// Access and refresh token pair handed back after any successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining a new pair
    pub refresh_token: String,

    /// Token type (always "bearer")
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    pub role: UserRole,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            given_name: model.given_name,
            family_name: model.family_name,
            picture: model.picture,
            role: model.role,
        }
    }
}

/// Acknowledgement for a verification-code request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneCodeSent {
    pub message: String,
    /// Unix timestamp after which the code can no longer be redeemed
    pub expires_at: i64,
}
