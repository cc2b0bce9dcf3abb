use std::fmt;
use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::config::TokenLifetimes;
use crate::errors::InternalError;
use crate::errors::internal::TokenError;
use crate::providers::clock_provider::ClockProvider;
use crate::providers::token_codec::TokenCodec;
use crate::stores::RevocationStore;
use crate::types::db::revocation_entry;
use crate::types::dto::TokenPair;
use crate::types::internal::claims::RESERVED_CLAIMS;
use crate::types::internal::{
    AccessClaims, Claims, ClaimsHeader, CustomClaims, EmailVerificationClaims, NewRevocation,
    PhoneVerificationClaims, RefreshClaims, RevocationReason, TokenPurpose, TokenType,
};

/// Issues, validates, rotates and revokes tokens
///
/// Access tokens are stateless and never revoked individually. Refresh tokens
/// are checked against the revocation store on every validation.
pub struct TokenProvider {
    codec: TokenCodec,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn ClockProvider>,
    revocations: RevocationStore,
}

impl TokenProvider {
    pub fn new(codec: TokenCodec, lifetimes: TokenLifetimes, clock: Arc<dyn ClockProvider>) -> Self {
        Self {
            codec,
            lifetimes,
            clock,
            revocations: RevocationStore::new(),
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    fn header(&self, subject: &str, ttl: chrono::Duration) -> Result<ClaimsHeader, InternalError> {
        Ok(ClaimsHeader {
            sub: subject.to_string(),
            jti: self.clock.unique_id(),
            exp: self.clock.expiry_timestamp(ttl)?,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, InternalError> {
        Ok(self.codec.sign(claims)?)
    }

    pub fn create_access_token(&self, subject: &str) -> Result<String, InternalError> {
        self.create_access_token_with_claims(subject, CustomClaims::new())
    }

    /// Create an access token carrying extra caller-supplied claims
    ///
    /// Custom claims may not reuse the names of standard claims.
    pub fn create_access_token_with_claims(
        &self,
        subject: &str,
        custom: CustomClaims,
    ) -> Result<String, InternalError> {
        check_custom_claims(&custom)?;
        let claims = Claims::Access(AccessClaims {
            header: self.header(subject, self.lifetimes.access)?,
            custom,
        });
        self.sign(&claims)
    }

    /// Create a refresh token; nothing is persisted until it is rotated or revoked
    pub fn create_refresh_token(&self, subject: &str) -> Result<String, InternalError> {
        let claims = Claims::Refresh(RefreshClaims {
            header: self.header(subject, self.lifetimes.refresh)?,
        });
        self.sign(&claims)
    }

    /// Create a token restricted to one workflow
    ///
    /// # Arguments
    /// * `subject` - User email
    /// * `purpose` - Workflow the token is valid for
    /// * `ttl` - Lifetime override; defaults to the purpose's configured lifetime
    pub fn create_single_purpose_token(
        &self,
        subject: &str,
        purpose: TokenPurpose,
        ttl: Option<chrono::Duration>,
    ) -> Result<String, InternalError> {
        let claims = match purpose {
            TokenPurpose::EmailVerification { custom } => {
                check_custom_claims(&custom)?;
                let ttl = ttl.unwrap_or(self.lifetimes.email_verification);
                Claims::EmailVerification(EmailVerificationClaims {
                    header: self.header(subject, ttl)?,
                    custom,
                })
            }
            TokenPurpose::PhoneVerification { phone_number } => {
                let ttl = ttl.unwrap_or(self.lifetimes.phone_code);
                Claims::PhoneVerification(PhoneVerificationClaims {
                    header: self.header(subject, ttl)?,
                    phone_number,
                })
            }
        };
        self.sign(&claims)
    }

    pub fn create_email_verification_token(&self, subject: &str) -> Result<String, InternalError> {
        self.create_single_purpose_token(subject, TokenPurpose::email_verification(), None)
    }

    pub fn issue_token_pair(&self, subject: &str) -> Result<TokenPair, InternalError> {
        let access_token = self.create_access_token(subject)?;
        let refresh_token = self.create_refresh_token(subject)?;
        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    /// Verify signature and expiry against the injected clock
    fn decode(&self, token: &str) -> Result<Claims, InternalError> {
        let claims = self
            .codec
            .decode_and_verify(token, self.clock.now())
            .map_err(TokenError::from)?;
        Ok(claims)
    }

    fn decode_as(&self, token: &str, expected: TokenType) -> Result<Claims, InternalError> {
        let claims = self.decode(token)?;
        let actual = claims.token_type();
        if actual != expected {
            return Err(TokenError::WrongTokenType { expected, actual }.into());
        }
        Ok(claims)
    }

    /// Decode a token and require it to be of `expected` type
    ///
    /// Refresh tokens are additionally rejected once their jti is revoked.
    pub async fn validate(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
        expected: TokenType,
    ) -> Result<Claims, InternalError> {
        let claims = self.decode_as(token, expected)?;

        if expected == TokenType::Refresh && self.revocations.is_revoked(conn, claims.jti()).await? {
            return Err(TokenError::Revoked {
                jti: claims.jti().to_string(),
            }
            .into());
        }

        Ok(claims)
    }

    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, InternalError> {
        match self.decode_as(token, TokenType::Access)? {
            Claims::Access(claims) => Ok(claims),
            other => Err(wrong_type(TokenType::Access, &other)),
        }
    }

    pub async fn validate_refresh(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
    ) -> Result<RefreshClaims, InternalError> {
        match self.validate(conn, token, TokenType::Refresh).await? {
            Claims::Refresh(claims) => Ok(claims),
            other => Err(wrong_type(TokenType::Refresh, &other)),
        }
    }

    /// Decode a refresh token without consulting the revocation store
    pub(crate) fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, InternalError> {
        match self.decode_as(token, TokenType::Refresh)? {
            Claims::Refresh(claims) => Ok(claims),
            other => Err(wrong_type(TokenType::Refresh, &other)),
        }
    }

    pub fn validate_email_verification(
        &self,
        token: &str,
    ) -> Result<EmailVerificationClaims, InternalError> {
        match self.decode_as(token, TokenType::EmailVerification)? {
            Claims::EmailVerification(claims) => Ok(claims),
            other => Err(wrong_type(TokenType::EmailVerification, &other)),
        }
    }

    pub fn validate_phone_verification(
        &self,
        token: &str,
    ) -> Result<PhoneVerificationClaims, InternalError> {
        match self.decode_as(token, TokenType::PhoneVerification)? {
            Claims::PhoneVerification(claims) => Ok(claims),
            other => Err(wrong_type(TokenType::PhoneVerification, &other)),
        }
    }

    async fn revoke_entry(
        &self,
        conn: &impl ConnectionTrait,
        entry: NewRevocation,
    ) -> Result<(revocation_entry::Model, bool), InternalError> {
        let (stored, created) = self
            .revocations
            .insert_if_absent(conn, self.clock.unique_id(), &entry, self.clock.timestamp())
            .await?;

        if created {
            tracing::debug!(
                jti = %stored.jti,
                token_type = %stored.token_type,
                reason = stored.reason.as_deref().unwrap_or("none"),
                "Token revoked"
            );
        }

        Ok((stored, created))
    }

    /// Revoke a token id
    ///
    /// Idempotent: revoking an already revoked jti returns the stored entry
    /// unchanged.
    ///
    /// # Arguments
    /// * `conn` - Connection or transaction
    /// * `jti` - Token id to revoke
    /// * `token_type` - Type of the revoked token
    /// * `user_id` - Owning user, if known
    /// * `expires_at` - The token's own `exp`; the entry is prunable afterwards
    /// * `reason` - Why the token was revoked
    pub async fn revoke(
        &self,
        conn: &impl ConnectionTrait,
        jti: &str,
        token_type: TokenType,
        user_id: Option<&str>,
        expires_at: i64,
        reason: RevocationReason,
    ) -> Result<revocation_entry::Model, InternalError> {
        let entry = NewRevocation {
            jti: jti.to_string(),
            token_type,
            user_id: user_id.map(str::to_string),
            expires_at,
            reason: Some(reason.as_str().to_string()),
        };
        let (stored, _) = self.revoke_entry(conn, entry).await?;
        Ok(stored)
    }

    pub async fn revoke_refresh_token(
        &self,
        conn: &impl ConnectionTrait,
        claims: &RefreshClaims,
        user_id: Option<&str>,
        reason: RevocationReason,
    ) -> Result<revocation_entry::Model, InternalError> {
        self.revoke(
            conn,
            &claims.header.jti,
            TokenType::Refresh,
            user_id,
            claims.header.exp,
            reason,
        )
        .await
    }

    /// Exchange a validated refresh token for a new pair
    ///
    /// The old jti is revoked first. Only the caller whose insert created the
    /// revocation entry gets a new pair; every other attempt with the same
    /// token fails with `Revoked`, so a stolen refresh token is single use even
    /// under concurrent rotation.
    pub async fn rotate(
        &self,
        conn: &impl ConnectionTrait,
        claims: &RefreshClaims,
        user_id: Option<&str>,
    ) -> Result<TokenPair, InternalError> {
        let entry = NewRevocation {
            jti: claims.header.jti.clone(),
            token_type: TokenType::Refresh,
            user_id: user_id.map(str::to_string),
            expires_at: claims.header.exp,
            reason: Some(RevocationReason::Rotated.as_str().to_string()),
        };

        let (_, created) = self.revoke_entry(conn, entry).await?;
        if !created {
            tracing::warn!(jti = %claims.header.jti, "Refresh token replayed during rotation");
            return Err(TokenError::Revoked {
                jti: claims.header.jti.clone(),
            }
            .into());
        }

        self.issue_token_pair(&claims.header.sub)
    }

    /// Remove revocation entries whose token has expired anyway
    pub async fn prune_revocations(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        let removed = self.revocations.prune_expired(conn, self.clock.timestamp()).await?;
        tracing::info!(removed, "Pruned expired revocation entries");
        Ok(removed)
    }
}

fn check_custom_claims(custom: &CustomClaims) -> Result<(), InternalError> {
    match custom.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
        Some(key) => Err(TokenError::ReservedClaim(key.clone()).into()),
        None => Ok(()),
    }
}

fn wrong_type(expected: TokenType, actual: &Claims) -> InternalError {
    TokenError::WrongTokenType {
        expected,
        actual: actual.token_type(),
    }
    .into()
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("codec", &self.codec)
            .field("lifetimes", &self.lifetimes)
            .finish()
    }
}
