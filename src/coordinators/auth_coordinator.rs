use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::errors::internal::TokenError;
use crate::errors::AuthError;
use crate::providers::{IdentityProvider, OutboundEmail, TokenProvider, dispatch_in_background};
use crate::types::db::{AuthProvider, user};
use crate::types::dto::{TokenPair, UserProfile};
use crate::types::internal::{ProviderProfile, RevocationReason};

/// Authentication coordinator that orchestrates login, refresh and logout workflows
///
/// Composes token and identity provider operations. Every failure leaves
/// through `AuthError::from_internal_error`, so callers only ever see the
/// generic error kinds.
pub struct AuthCoordinator {
    db: DatabaseConnection,
    token_provider: Arc<TokenProvider>,
    identity_provider: Arc<IdentityProvider>,
}

impl AuthCoordinator {
    /// Create AuthCoordinator from AppData
    ///
    /// # Arguments
    /// * `app_data` - Application data containing the connection and providers
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            token_provider: Arc::clone(&app_data.token_provider),
            identity_provider: Arc::clone(&app_data.identity_provider),
        }
    }

    /// Get a reference to the internal TokenProvider
    pub fn token_provider(&self) -> Arc<TokenProvider> {
        self.token_provider.clone()
    }

    /// Start a magic-link login
    ///
    /// Coordinates the sequence of operations:
    /// 1. Get or create the user for `email`
    /// 2. Refuse disabled users
    /// 3. Mint an email-verification token
    /// 4. Hand the login link to the dispatcher in the background
    pub async fn start_email_login(&self, email: &str) -> Result<(), AuthError> {
        // Step 1: Resolve user
        let user = self
            .identity_provider
            .get_or_create_by_email(&self.db, email)
            .await
            .map_err(AuthError::from_internal_error)?;

        // Step 2: Refuse disabled users
        if !user.is_active() {
            tracing::warn!(user_id = %user.id, "Login link requested for disabled user");
            return Err(AuthError::unauthorized());
        }

        // Step 3: Mint token
        let token = self
            .token_provider
            .create_email_verification_token(&user.email)
            .map_err(AuthError::from_internal_error)?;

        // Step 4: Dispatch
        dispatch_in_background(
            self.identity_provider.dispatcher(),
            OutboundEmail::LoginLink {
                email: user.email.clone(),
                token,
            },
        );

        tracing::info!(user_id = %user.id, "Login link issued");
        Ok(())
    }

    /// Complete a magic-link login with the emailed token
    ///
    /// # Returns
    /// * `Ok(TokenPair)` - Fresh access and refresh tokens
    /// * `Err(AuthError::Unauthorized)` - Token invalid, expired, of another type, or user inactive
    pub async fn complete_email_login(&self, token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .token_provider
            .validate_email_verification(token)
            .map_err(AuthError::from_internal_error)?;

        let user = self
            .identity_provider
            .require_active_user(&self.db, &claims.header.sub)
            .await
            .map_err(AuthError::from_internal_error)?;

        let pair = self
            .token_provider
            .issue_token_pair(&user.email)
            .map_err(AuthError::from_internal_error)?;

        tracing::info!(user_id = %user.id, "Email login completed");
        Ok(pair)
    }

    /// Orchestrate refresh token rotation
    ///
    /// Coordinates the sequence of operations:
    /// 1. Validate the refresh token (signature, expiry, type, not revoked)
    /// 2. Require the subject to be an active user
    /// 3. Rotate: revoke the old jti and issue a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        // Step 1: Validate
        let claims = self
            .token_provider
            .validate_refresh(&self.db, refresh_token)
            .await
            .map_err(AuthError::from_internal_error)?;

        // Step 2: Active user
        let user = self
            .identity_provider
            .require_active_user(&self.db, &claims.header.sub)
            .await
            .map_err(AuthError::from_internal_error)?;

        // Step 3: Rotate
        let pair = self
            .token_provider
            .rotate(&self.db, &claims, Some(&user.id))
            .await
            .map_err(AuthError::from_internal_error)?;

        tracing::info!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Orchestrate logout
    ///
    /// The access token must be valid for an active user. A supplied refresh
    /// token must belong to the same subject and is revoked; revoking an
    /// already revoked token succeeds. Access tokens stay valid until they
    /// expire.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let user = self.current_active_user(access_token).await?;

        let Some(refresh_token) = refresh_token else {
            tracing::info!(user_id = %user.id, "Logout without refresh token");
            return Ok(());
        };

        let claims = self
            .token_provider
            .decode_refresh(refresh_token)
            .map_err(AuthError::from_internal_error)?;

        if claims.header.sub != user.email {
            return Err(AuthError::from_internal_error(TokenError::SubjectMismatch.into()));
        }

        self.token_provider
            .revoke_refresh_token(&self.db, &claims, Some(&user.id), RevocationReason::Logout)
            .await
            .map_err(AuthError::from_internal_error)?;

        tracing::info!(user_id = %user.id, "Logout completed");
        Ok(())
    }

    /// Process an external-provider login callback
    ///
    /// Coordinates the sequence of operations:
    /// 1. Get or create the user for the provider email
    /// 2. Refuse disabled users
    /// 3. Link (or refresh) the external account and backfill the profile
    /// 4. Issue a token pair
    pub async fn login_with_provider(
        &self,
        provider: AuthProvider,
        profile: &ProviderProfile,
    ) -> Result<TokenPair, AuthError> {
        // Step 1: Resolve user
        let user = self
            .identity_provider
            .get_or_create_by_email(&self.db, &profile.email)
            .await
            .map_err(AuthError::from_internal_error)?;

        // Step 2: Refuse disabled users
        if !user.is_active() {
            tracing::warn!(user_id = %user.id, provider = %provider, "Provider login for disabled user");
            return Err(AuthError::unauthorized());
        }

        // Step 3: Link
        let linked = self
            .identity_provider
            .link_or_update_external_account(&self.db, &user, provider, profile)
            .await
            .map_err(AuthError::from_internal_error)?;

        // Step 4: Tokens
        let pair = self
            .token_provider
            .issue_token_pair(&linked.user.email)
            .map_err(AuthError::from_internal_error)?;

        tracing::info!(user_id = %linked.user.id, provider = %provider, "Provider login completed");
        Ok(pair)
    }

    /// Resolve the active user behind an access token
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        self.current_active_user(access_token).await.map(UserProfile::from)
    }

    /// Resolve the active admin behind an access token
    ///
    /// # Returns
    /// * `Err(AuthError::Unauthorized)` - Token or user invalid
    /// * `Err(AuthError::Forbidden)` - Valid user without admin role
    pub async fn current_admin(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let user = self.current_active_user(access_token).await?;

        self.identity_provider
            .require_admin(&user)
            .map_err(AuthError::from_internal_error)?;

        Ok(UserProfile::from(user))
    }

    async fn current_active_user(&self, access_token: &str) -> Result<user::Model, AuthError> {
        let claims = self
            .token_provider
            .validate_access(access_token)
            .map_err(AuthError::from_internal_error)?;

        self.identity_provider
            .require_active_user(&self.db, &claims.header.sub)
            .await
            .map_err(AuthError::from_internal_error)
    }
}
