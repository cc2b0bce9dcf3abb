//! Token claims, one closed variant per token type.
//!
//! Every variant shares [`ClaimsHeader`]; the `type` tag selects the variant
//! on decode, so a payload minted for one workflow can never be read as
//! another. The wire payload is `{sub, type, exp, jti}` plus the variant's
//! own fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::token::TokenType;

/// Caller-supplied claims carried alongside the standard ones
pub type CustomClaims = Map<String, Value>;

/// Claim names owned by the token layer; custom claims may not use them
pub const RESERVED_CLAIMS: [&str; 5] = ["sub", "type", "exp", "jti", "iat"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsHeader {
    /// Subject (user email)
    pub sub: String,
    /// Unique token id, the revocation key
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub header: ClaimsHeader,
    #[serde(flatten)]
    pub custom: CustomClaims,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub header: ClaimsHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailVerificationClaims {
    #[serde(flatten)]
    pub header: ClaimsHeader,
    #[serde(flatten)]
    pub custom: CustomClaims,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneVerificationClaims {
    #[serde(flatten)]
    pub header: ClaimsHeader,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Claims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
    EmailVerification(EmailVerificationClaims),
    PhoneVerification(PhoneVerificationClaims),
}

impl Claims {
    pub fn header(&self) -> &ClaimsHeader {
        match self {
            Claims::Access(c) => &c.header,
            Claims::Refresh(c) => &c.header,
            Claims::EmailVerification(c) => &c.header,
            Claims::PhoneVerification(c) => &c.header,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Claims::Access(_) => TokenType::Access,
            Claims::Refresh(_) => TokenType::Refresh,
            Claims::EmailVerification(_) => TokenType::EmailVerification,
            Claims::PhoneVerification(_) => TokenType::PhoneVerification,
        }
    }

    pub fn subject(&self) -> &str {
        &self.header().sub
    }

    pub fn jti(&self) -> &str {
        &self.header().jti
    }

    pub fn expires_at(&self) -> i64 {
        self.header().exp
    }
}
