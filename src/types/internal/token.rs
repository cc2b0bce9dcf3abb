use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

use super::claims::CustomClaims;

/// Token type tag carried in the `type` claim and in revocation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    #[sea_orm(string_value = "access")]
    Access,
    #[sea_orm(string_value = "refresh")]
    Refresh,
    #[sea_orm(string_value = "email_verification")]
    EmailVerification,
    #[sea_orm(string_value = "phone_verification")]
    PhoneVerification,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::EmailVerification => "email_verification",
            TokenType::PhoneVerification => "phone_verification",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow a single-purpose token is restricted to
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPurpose {
    EmailVerification { custom: CustomClaims },
    PhoneVerification { phone_number: String },
}

impl TokenPurpose {
    pub fn email_verification() -> Self {
        TokenPurpose::EmailVerification {
            custom: CustomClaims::new(),
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            TokenPurpose::EmailVerification { .. } => TokenType::EmailVerification,
            TokenPurpose::PhoneVerification { .. } => TokenType::PhoneVerification,
        }
    }
}

/// Why a token was put on the revocation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationReason {
    Rotated,
    Logout,
    Administrative,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::Administrative => "administrative",
        }
    }
}

/// Everything needed to record a revocation
#[derive(Debug, Clone)]
pub struct NewRevocation {
    pub jti: String,
    pub token_type: TokenType,
    pub user_id: Option<String>,
    pub expires_at: i64,
    pub reason: Option<String>,
}
