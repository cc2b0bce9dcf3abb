use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::errors::internal::{TokenDecodeError, TokenError};
use crate::types::internal::Claims;

/// Signs and verifies claims sets with an HMAC secret
///
/// Only the configured algorithm is accepted on decode. Expiry is checked
/// against the caller-supplied `now` after the signature has been verified,
/// with no leeway: a token is expired once `now >= exp`.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // exp is compared against the injected clock in decode_and_verify
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encode and sign a claims set
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Verify the signature, decode the claims and check expiry
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `now` - Instant the expiry check is made against
    ///
    /// # Returns
    /// * `Ok(Claims)` - Signature valid and token not yet expired
    /// * `Err(TokenDecodeError)` - Malformed, InvalidSignature, Expired or Unsupported
    pub fn decode_and_verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenDecodeError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenDecodeError::from_jwt)?;

        let claims = data.claims;
        if now.timestamp() >= claims.expires_at() {
            return Err(TokenDecodeError::expired());
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}
