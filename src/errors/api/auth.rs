use crate::errors::internal::{IdentityError, InternalError, TokenError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standardized error body for authentication operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Any token failure, unknown user or disabled user (401)
    Unauthorized(AuthErrorResponse),

    /// Authenticated but lacking the admin role (403)
    Forbidden(AuthErrorResponse),

    /// No redeemable verification code matched (400)
    InvalidOrExpiredCode(AuthErrorResponse),

    /// Phone number is bound to a different user (409)
    PhoneAlreadyBound(AuthErrorResponse),

    /// Provider identity is linked to a different user (409)
    DuplicateExternalIdentity(AuthErrorResponse),

    /// Storage failure; safe to retry (503)
    Unavailable(AuthErrorResponse),

    /// Internal server error (500)
    InternalError(AuthErrorResponse),
}

impl AuthError {
    /// Create an Unauthorized error
    pub fn unauthorized() -> Self {
        AuthError::Unauthorized(AuthErrorResponse {
            error: "unauthorized".to_string(),
            message: "Could not validate credentials".to_string(),
            status_code: 401,
        })
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        AuthError::Forbidden(AuthErrorResponse {
            error: "forbidden".to_string(),
            message: "Admin privileges required".to_string(),
            status_code: 403,
        })
    }

    /// Create an InvalidOrExpiredCode error
    pub fn invalid_or_expired_code() -> Self {
        AuthError::InvalidOrExpiredCode(AuthErrorResponse {
            error: "invalid_or_expired_code".to_string(),
            message: "Invalid or expired verification code".to_string(),
            status_code: 400,
        })
    }

    /// Create a PhoneAlreadyBound error
    pub fn phone_already_bound() -> Self {
        AuthError::PhoneAlreadyBound(AuthErrorResponse {
            error: "phone_already_bound".to_string(),
            message: "Phone number is already linked to another account".to_string(),
            status_code: 409,
        })
    }

    /// Create a DuplicateExternalIdentity error
    pub fn duplicate_external_identity() -> Self {
        AuthError::DuplicateExternalIdentity(AuthErrorResponse {
            error: "duplicate_external_identity".to_string(),
            message: "This external account is already linked to another user".to_string(),
            status_code: 409,
        })
    }

    /// Create an Unavailable error
    pub fn unavailable() -> Self {
        AuthError::Unavailable(AuthErrorResponse {
            error: "unavailable".to_string(),
            message: "Service temporarily unavailable, please retry".to_string(),
            status_code: 503,
        })
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to caller-facing errors.
    /// Internal error details are logged but not exposed to callers. Every token failure
    /// collapses to `Unauthorized` so the caller cannot learn which check failed.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            // Infrastructure errors
            InternalError::Database(_) => {
                tracing::error!("Storage failure: {}", err);
                Self::unavailable()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }

            InternalError::ExpiryOutOfRange { .. } => {
                tracing::error!("Expiry computation failed: {}", err);
                Self::internal_server_error()
            }

            // Token errors
            InternalError::Token(TokenError::Decode(decode)) => {
                tracing::debug!(class = %decode.class, note = decode.note, "Token rejected");
                Self::unauthorized()
            }
            InternalError::Token(TokenError::WrongTokenType { expected, actual }) => {
                tracing::warn!("Token type mismatch: expected {}, got {}", expected, actual);
                Self::unauthorized()
            }
            InternalError::Token(TokenError::Revoked { jti }) => {
                tracing::warn!("Revoked token presented: jti={}", jti);
                Self::unauthorized()
            }
            InternalError::Token(TokenError::SubjectMismatch) => {
                tracing::warn!("Token subject mismatch");
                Self::unauthorized()
            }
            InternalError::Token(TokenError::ReservedClaim(_))
            | InternalError::Token(TokenError::Encode(_)) => {
                tracing::error!("Token issuance failed: {}", err);
                Self::internal_server_error()
            }

            // Identity errors
            InternalError::Identity(IdentityError::UserNotFound(_))
            | InternalError::Identity(IdentityError::UserDisabled(_)) => {
                tracing::debug!("Authentication refused: {}", err);
                Self::unauthorized()
            }
            InternalError::Identity(IdentityError::AdminRequired(user_id)) => {
                tracing::warn!("Non-admin user {} attempted an admin operation", user_id);
                Self::forbidden()
            }
            InternalError::Identity(IdentityError::InvalidOrExpiredCode) => {
                tracing::debug!("Verification code rejected");
                Self::invalid_or_expired_code()
            }
            InternalError::Identity(IdentityError::PhoneAlreadyBound(phone)) => {
                tracing::warn!("Phone {} already bound to another user", phone);
                Self::phone_already_bound()
            }
            InternalError::Identity(IdentityError::DuplicateExternalIdentity {
                provider,
                provider_id,
            }) => {
                tracing::warn!(
                    "External identity {}:{} already linked to another user",
                    provider,
                    provider_id
                );
                Self::duplicate_external_identity()
            }
        }
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    fn internal_server_error() -> Self {
        AuthError::InternalError(AuthErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        })
    }

    /// Borrow the response body carried by the variant
    pub fn response(&self) -> &AuthErrorResponse {
        match self {
            AuthError::Unauthorized(body)
            | AuthError::Forbidden(body)
            | AuthError::InvalidOrExpiredCode(body)
            | AuthError::PhoneAlreadyBound(body)
            | AuthError::DuplicateExternalIdentity(body)
            | AuthError::Unavailable(body)
            | AuthError::InternalError(body) => body,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.response().message.clone()
    }

    pub fn error_code(&self) -> &str {
        &self.response().error
    }

    pub fn status_code(&self) -> u16 {
        self.response().status_code
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AuthError {}
