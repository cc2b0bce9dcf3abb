use std::fmt;

use thiserror::Error;

use crate::types::internal::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFailClass {
    /// Not structurally a token, or the payload is not a known claims set
    Malformed,

    /// Signature verification failed
    InvalidSignature,

    /// Signature is fine but `exp` has passed
    Expired,

    /// Algorithm or key format that the codec does not accept
    Unsupported,
}

impl fmt::Display for TokenFailClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenFailClass::Malformed => "malformed",
            TokenFailClass::InvalidSignature => "invalid_signature",
            TokenFailClass::Expired => "expired",
            TokenFailClass::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Decode/verify failure, kept for logging. Callers only ever see `Unauthorized`.
#[derive(Debug, Error)]
#[error("Token rejected ({class}): {note}")]
pub struct TokenDecodeError {
    pub class: TokenFailClass,

    /// Small, stable hint like "signature", "exp", "claims"
    pub note: &'static str,

    #[source]
    pub source: Option<jsonwebtoken::errors::Error>,
}

impl TokenDecodeError {
    pub fn expired() -> Self {
        Self {
            class: TokenFailClass::Expired,
            note: "exp",
            source: None,
        }
    }

    pub fn from_jwt(err: jsonwebtoken::errors::Error) -> Self {
        let (class, note) = classify_jwt_error(&err);
        Self {
            class,
            note,
            source: Some(err),
        }
    }
}

fn classify_jwt_error(err: &jsonwebtoken::errors::Error) -> (TokenFailClass, &'static str) {
    use jsonwebtoken::errors::ErrorKind::*;

    match err.kind() {
        // Not a token / undecodable payload / unknown type tag
        InvalidToken | Base64(_) | Json(_) | Utf8(_) => (TokenFailClass::Malformed, "malformed"),
        MissingRequiredClaim(_) => (TokenFailClass::Malformed, "claims"),

        InvalidSignature => (TokenFailClass::InvalidSignature, "signature"),

        ExpiredSignature => (TokenFailClass::Expired, "exp"),

        // Header names an algorithm other than the configured one
        InvalidAlgorithm | MissingAlgorithm | InvalidAlgorithmName | InvalidKeyFormat => {
            (TokenFailClass::Unsupported, "algorithm")
        }

        _ => (TokenFailClass::Malformed, "rejected"),
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] TokenDecodeError),

    #[error("Expected a {expected} token, got {actual}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Token {jti} has been revoked")]
    Revoked { jti: String },

    #[error("Token subject does not match the authenticated user")]
    SubjectMismatch,

    #[error("Custom claim '{0}' collides with a reserved claim")]
    ReservedClaim(String),

    #[error("Token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn test_classify_signature_failure() {
        let err = TokenDecodeError::from_jwt(ErrorKind::InvalidSignature.into());
        assert_eq!(err.class, TokenFailClass::InvalidSignature);
    }

    #[test]
    fn test_classify_malformed_token() {
        let err = TokenDecodeError::from_jwt(ErrorKind::InvalidToken.into());
        assert_eq!(err.class, TokenFailClass::Malformed);
    }

    #[test]
    fn test_classify_algorithm_mismatch_as_unsupported() {
        let err = TokenDecodeError::from_jwt(ErrorKind::InvalidAlgorithm.into());
        assert_eq!(err.class, TokenFailClass::Unsupported);
    }

    #[test]
    fn test_classify_missing_claim_as_malformed() {
        let err = TokenDecodeError::from_jwt(ErrorKind::MissingRequiredClaim("exp".to_string()).into());
        assert_eq!(err.class, TokenFailClass::Malformed);
        assert_eq!(err.note, "claims");
    }

    #[test]
    fn test_expired_display_names_class() {
        assert!(TokenDecodeError::expired().to_string().contains("expired"));
    }
}
