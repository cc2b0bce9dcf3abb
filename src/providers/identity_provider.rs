use std::fmt;
use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::errors::InternalError;
use crate::errors::internal::IdentityError;
use crate::providers::clock_provider::ClockProvider;
use crate::providers::crypto_provider::CryptoProvider;
use crate::providers::email_provider::{EmailDispatcher, OutboundEmail, dispatch_in_background};
use crate::stores::{PhoneBindingStore, SocialAccountStore, UserStore, VerificationCodeStore};
use crate::types::db::{AuthProvider, UserRole, phone_binding, social_account, user, verification_code};
use crate::types::internal::{ProviderProfile, normalize_email};

/// A user together with the external account that was linked or refreshed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedIdentity {
    pub user: user::Model,
    pub account: social_account::Model,
}

/// Accounts, external-provider links and phone bindings
pub struct IdentityProvider {
    clock: Arc<dyn ClockProvider>,
    crypto: CryptoProvider,
    dispatcher: Arc<dyn EmailDispatcher>,
    code_ttl: chrono::Duration,
    users: UserStore,
    social_accounts: SocialAccountStore,
    phone_bindings: PhoneBindingStore,
    codes: VerificationCodeStore,
}

impl IdentityProvider {
    pub fn new(
        clock: Arc<dyn ClockProvider>,
        dispatcher: Arc<dyn EmailDispatcher>,
        code_ttl: chrono::Duration,
    ) -> Self {
        Self {
            clock,
            crypto: CryptoProvider::new(),
            dispatcher,
            code_ttl,
            users: UserStore::new(),
            social_accounts: SocialAccountStore::new(),
            phone_bindings: PhoneBindingStore::new(),
            codes: VerificationCodeStore::new(),
        }
    }

    pub fn dispatcher(&self) -> Arc<dyn EmailDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Return the user for `email`, creating it on first sight
    ///
    /// Idempotent under concurrent calls: the unique email decides.
    pub async fn get_or_create_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<user::Model, InternalError> {
        let (user, created) = self
            .users
            .insert_if_absent(conn, self.clock.unique_id(), email, self.clock.timestamp())
            .await?;

        if created {
            tracing::info!(user_id = %user.id, "User created");
        }

        Ok(user)
    }

    pub async fn find_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        self.users.find_by_email(conn, email).await
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        self.users.find_by_id(conn, id).await
    }

    /// Resolve an email to an existing, enabled user
    ///
    /// # Returns
    /// * `Err(IdentityError::UserNotFound)` - No such user
    /// * `Err(IdentityError::UserDisabled)` - User exists but is disabled
    pub async fn require_active_user(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .users
            .find_by_email(conn, email)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(normalize_email(email)))?;

        ensure_active(&user)?;
        Ok(user)
    }

    pub fn require_admin(&self, user: &user::Model) -> Result<(), InternalError> {
        if user.is_admin() {
            Ok(())
        } else {
            Err(IdentityError::AdminRequired(user.id.clone()).into())
        }
    }

    /// Link an external identity to `user`, or refresh an existing link
    ///
    /// Runs in one transaction. An identity already linked to a different user
    /// fails with `DuplicateExternalIdentity` and nothing changes. Empty user
    /// profile fields are backfilled from the provider profile.
    pub async fn link_or_update_external_account(
        &self,
        db: &DatabaseConnection,
        user: &user::Model,
        provider: AuthProvider,
        profile: &ProviderProfile,
    ) -> Result<LinkedIdentity, InternalError> {
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        let now = self.clock.timestamp();
        let account = self.link_in_txn(&txn, user, provider, profile, now).await?;
        // Backfill against the row as of this transaction, not the caller's copy
        let current = self.users.require(&txn, &user.id).await?;
        let user = self.users.backfill_profile(&txn, current, profile, now).await?;

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        Ok(LinkedIdentity { user, account })
    }

    async fn link_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user: &user::Model,
        provider: AuthProvider,
        profile: &ProviderProfile,
        now: i64,
    ) -> Result<social_account::Model, InternalError> {
        if let Some(existing) = self
            .social_accounts
            .find_by_provider_identity(txn, provider, &profile.provider_id)
            .await?
        {
            return self.refresh_link(txn, existing, user, provider, profile, now).await;
        }

        // Savepoint so a lost insert race leaves the outer transaction usable
        let savepoint = txn.begin().await.map_err(InternalError::transaction_begin)?;
        let inserted = self
            .social_accounts
            .insert(&savepoint, self.clock.unique_id(), &user.id, provider, profile, now)
            .await;

        match inserted {
            Ok(account) => {
                savepoint.commit().await.map_err(InternalError::transaction_commit)?;
                tracing::info!(user_id = %user.id, provider = %provider, "External account linked");
                Ok(account)
            }
            Err(e) if e.is_unique_violation() => {
                savepoint
                    .rollback()
                    .await
                    .map_err(InternalError::transaction_rollback)?;
                tracing::debug!(provider = %provider, "Concurrent link detected, re-reading");
                let existing = self
                    .social_accounts
                    .find_by_provider_identity(txn, provider, &profile.provider_id)
                    .await?
                    .ok_or(e)?;
                self.refresh_link(txn, existing, user, provider, profile, now).await
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_link(
        &self,
        txn: &DatabaseTransaction,
        existing: social_account::Model,
        user: &user::Model,
        provider: AuthProvider,
        profile: &ProviderProfile,
        now: i64,
    ) -> Result<social_account::Model, InternalError> {
        if existing.user_id != user.id {
            tracing::warn!(
                provider = %provider,
                owner = %existing.user_id,
                requested_by = %user.id,
                "External identity already linked to another user"
            );
            return Err(IdentityError::DuplicateExternalIdentity {
                provider,
                provider_id: profile.provider_id.clone(),
            }
            .into());
        }

        self.social_accounts.record_use(txn, existing, profile, now).await
    }

    /// Issue a verification code for binding `phone_number` to `email`
    ///
    /// The code is persisted before it is handed to the dispatcher on a
    /// background task; a dispatch failure is only logged. Earlier codes for
    /// the same pair stay valid until they expire.
    pub async fn request_phone_binding(
        &self,
        conn: &impl ConnectionTrait,
        phone_number: &str,
        email: &str,
    ) -> Result<verification_code::Model, InternalError> {
        let email = normalize_email(email);
        let code = self.crypto.generate_verification_code();
        let now = self.clock.timestamp();
        let expires_at = self.clock.expiry_timestamp(self.code_ttl)?;

        let stored = self
            .codes
            .insert(conn, &email, phone_number, &code, now, expires_at)
            .await?;

        tracing::info!(code_id = stored.id, "Phone verification code issued");

        dispatch_in_background(
            self.dispatcher(),
            OutboundEmail::PhoneVerificationCode {
                email,
                phone_number: phone_number.to_string(),
                code,
            },
        );

        Ok(stored)
    }

    /// Redeem a verification code and bind the phone number
    ///
    /// Code consumption and the binding change commit together or not at all.
    /// A failed redemption leaves the code unconsumed.
    ///
    /// # Returns
    /// * `Ok(user)` - The (possibly new) user now owning the verified phone
    /// * `Err(IdentityError::InvalidOrExpiredCode)` - No redeemable code for the triple
    /// * `Err(IdentityError::PhoneAlreadyBound)` - Phone belongs to another user
    pub async fn redeem_phone_binding(
        &self,
        db: &DatabaseConnection,
        email: &str,
        phone_number: &str,
        code: &str,
    ) -> Result<user::Model, InternalError> {
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        match self.redeem_in_txn(&txn, email, phone_number, code).await {
            Ok(user) => {
                txn.commit().await.map_err(InternalError::transaction_commit)?;
                tracing::info!(user_id = %user.id, "Phone binding verified");
                Ok(user)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Failed to roll back phone redemption: {:?}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn redeem_in_txn(
        &self,
        txn: &DatabaseTransaction,
        email: &str,
        phone_number: &str,
        code: &str,
    ) -> Result<user::Model, InternalError> {
        let email = normalize_email(email);
        let now = self.clock.timestamp();

        let pending = self
            .codes
            .find_redeemable(txn, &email, phone_number, code, now)
            .await?
            .ok_or(IdentityError::InvalidOrExpiredCode)?;

        if !self.codes.mark_used(txn, pending.id, now).await? {
            return Err(IdentityError::InvalidOrExpiredCode.into());
        }

        let (user, created) = self
            .users
            .insert_if_absent(txn, self.clock.unique_id(), &email, now)
            .await?;
        if created {
            tracing::info!(user_id = %user.id, "User created from phone verification");
        }
        ensure_active(&user)?;

        match self.phone_bindings.find_by_phone(txn, phone_number).await? {
            Some(binding) if binding.user_id == user.id => {
                self.phone_bindings.mark_verified(txn, binding, now).await?;
            }
            Some(binding) => {
                tracing::warn!(
                    owner = %binding.user_id,
                    requested_by = %user.id,
                    "Phone already bound to another user"
                );
                return Err(IdentityError::PhoneAlreadyBound(phone_number.to_string()).into());
            }
            None => {
                match self
                    .phone_bindings
                    .insert(txn, phone_number, &user.id, true, now)
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_unique_violation() => {
                        return Err(IdentityError::PhoneAlreadyBound(phone_number.to_string()).into());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(user)
    }

    pub async fn find_user_by_phone(
        &self,
        conn: &impl ConnectionTrait,
        phone_number: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        match self.phone_bindings.find_by_phone(conn, phone_number).await? {
            Some(binding) => self.users.find_by_id(conn, &binding.user_id).await,
            None => Ok(None),
        }
    }

    pub async fn list_social_accounts(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<social_account::Model>, InternalError> {
        self.social_accounts.list_for_user(conn, user_id).await
    }

    pub async fn list_phone_bindings(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<phone_binding::Model>, InternalError> {
        self.phone_bindings.list_for_user(conn, user_id).await
    }

    pub async fn promote_to_admin(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .users
            .set_role(conn, user_id, UserRole::Admin, self.clock.timestamp())
            .await?;
        tracing::info!(user_id = %user.id, "User promoted to admin");
        Ok(user)
    }

    pub async fn set_disabled(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        disabled: bool,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .users
            .set_disabled(conn, user_id, disabled, self.clock.timestamp())
            .await?;
        tracing::info!(user_id = %user.id, disabled, "User disabled flag changed");
        Ok(user)
    }

    /// Delete a user with its social accounts and phone bindings
    ///
    /// Revocation entries keep their row with the user reference cleared.
    pub async fn delete_user(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<(), InternalError> {
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        let accounts = self.social_accounts.delete_for_user(&txn, user_id).await?;
        let phones = self.phone_bindings.delete_for_user(&txn, user_id).await?;
        if self.users.delete(&txn, user_id).await? == 0 {
            return Err(IdentityError::UserNotFound(user_id.to_string()).into());
        }

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!(user_id, accounts, phones, "User deleted");
        Ok(())
    }

    /// Remove verification codes that are used or expired
    pub async fn prune_verification_codes(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<u64, InternalError> {
        let removed = self.codes.prune(conn, self.clock.timestamp()).await?;
        tracing::info!(removed, "Pruned spent verification codes");
        Ok(removed)
    }
}

fn ensure_active(user: &user::Model) -> Result<(), InternalError> {
    if user.is_active() {
        Ok(())
    } else {
        Err(IdentityError::UserDisabled(user.email.clone()).into())
    }
}

impl fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("code_ttl", &self.code_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;
    use crate::providers::email_provider::RecordingEmailDispatcher;
    use crate::test::utils::{google_profile, setup_test_db, test_clock, test_identity_provider};

    fn assert_identity_error(result: Result<impl fmt::Debug, InternalError>, check: fn(&IdentityError) -> bool) {
        match result {
            Err(InternalError::Identity(ref e)) if check(e) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent_and_normalizes() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();

        let first = identity.get_or_create_by_email(&db, "Alice@Example.com ").await.unwrap();
        let second = identity.get_or_create_by_email(&db, "alice@example.com").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "alice@example.com");
        assert_eq!(first.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_require_active_user() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();

        assert_identity_error(
            identity.require_active_user(&db, "ghost@example.com").await,
            |e| matches!(e, IdentityError::UserNotFound(_)),
        );

        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();
        assert!(identity.require_active_user(&db, "a@example.com").await.is_ok());

        identity.set_disabled(&db, &user.id, true).await.unwrap();
        assert_identity_error(
            identity.require_active_user(&db, "a@example.com").await,
            |e| matches!(e, IdentityError::UserDisabled(_)),
        );
    }

    #[tokio::test]
    async fn test_require_admin() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();

        assert_identity_error(identity.require_admin(&user), |e| {
            matches!(e, IdentityError::AdminRequired(_))
        });

        let admin = identity.promote_to_admin(&db, &user.id).await.unwrap();
        assert!(identity.require_admin(&admin).is_ok());
    }

    #[tokio::test]
    async fn test_link_creates_account_and_backfills_profile() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();

        let linked = identity
            .link_or_update_external_account(&db, &user, AuthProvider::Google, &google_profile("g-1"))
            .await
            .unwrap();

        assert_eq!(linked.account.user_id, user.id);
        assert_eq!(linked.account.provider_id, "g-1");
        assert!(linked.account.verified);
        assert_eq!(linked.user.full_name.as_deref(), Some("Alice Example"));
        assert_eq!(linked.user.picture.as_deref(), Some("https://example.com/a.png"));
    }

    #[tokio::test]
    async fn test_relink_updates_existing_account() {
        let db = setup_test_db().await;
        let (clock, _mail, identity) = test_identity_provider();
        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();

        let first = identity
            .link_or_update_external_account(&db, &user, AuthProvider::Google, &google_profile("g-1"))
            .await
            .unwrap();
        clock.advance(chrono::Duration::minutes(5));
        let mut renamed = google_profile("g-1");
        renamed.name = Some("Alice Renamed".to_string());
        renamed.email_verified = false;
        let second = identity
            .link_or_update_external_account(&db, &first.user, AuthProvider::Google, &renamed)
            .await
            .unwrap();

        assert_eq!(first.account.id, second.account.id);
        assert!(second.account.verified);
        assert!(second.account.last_used > first.account.last_used);
        // Existing user profile values win
        assert_eq!(second.user.full_name.as_deref(), Some("Alice Example"));
        assert_eq!(identity.list_social_accounts(&db, &user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_keeps_profile_written_after_caller_loaded_user() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let stale = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();
        assert!(stale.full_name.is_none());

        let mut earlier = google_profile("g-0");
        earlier.name = Some("Alice Elsewhere".to_string());
        identity
            .link_or_update_external_account(&db, &stale, AuthProvider::Google, &earlier)
            .await
            .unwrap();

        let linked = identity
            .link_or_update_external_account(&db, &stale, AuthProvider::Google, &google_profile("g-1"))
            .await
            .unwrap();

        assert_eq!(linked.user.full_name.as_deref(), Some("Alice Elsewhere"));
        let stored = identity.find_by_id(&db, &stale.id).await.unwrap().unwrap();
        assert_eq!(stored.full_name.as_deref(), Some("Alice Elsewhere"));
    }

    #[tokio::test]
    async fn test_link_owned_by_other_user_is_rejected() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let alice = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();
        let bob = identity.get_or_create_by_email(&db, "b@example.com").await.unwrap();

        identity
            .link_or_update_external_account(&db, &alice, AuthProvider::Google, &google_profile("g-1"))
            .await
            .unwrap();
        let result = identity
            .link_or_update_external_account(&db, &bob, AuthProvider::Google, &google_profile("g-1"))
            .await;

        assert_identity_error(result, |e| {
            matches!(e, IdentityError::DuplicateExternalIdentity { .. })
        });
        let bob_after = identity.find_by_id(&db, &bob.id).await.unwrap().unwrap();
        assert_eq!(bob_after.full_name, None);
        assert!(identity.list_social_accounts(&db, &bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_phone_binding_persists_and_dispatches() {
        let db = setup_test_db().await;
        let (clock, mail, identity) = test_identity_provider();

        let stored = identity
            .request_phone_binding(&db, "3413413413", "A@Example.com")
            .await
            .unwrap();

        assert_eq!(stored.email, "a@example.com");
        assert_eq!(stored.code.len(), 6);
        assert_eq!(stored.expires_at, clock.timestamp() + 600);
        assert!(stored.is_redeemable(clock.timestamp()));

        mail.wait_for_deliveries(1).await;
        assert_eq!(mail.last_code_for("3413413413"), Some(stored.code.clone()));
    }

    #[tokio::test]
    async fn test_request_succeeds_when_dispatch_fails() {
        let db = setup_test_db().await;
        let clock = test_clock();
        let identity = IdentityProvider::new(
            clock,
            Arc::new(RecordingEmailDispatcher::failing()),
            chrono::Duration::minutes(10),
        );

        assert!(identity.request_phone_binding(&db, "3413413413", "a@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_request_with_unrepresentable_expiry_stores_nothing() {
        let db = setup_test_db().await;
        let mail = Arc::new(RecordingEmailDispatcher::new());
        let identity = IdentityProvider::new(test_clock(), mail.clone(), chrono::Duration::days(1_000_000_000));

        let result = identity.request_phone_binding(&db, "3413413413", "a@example.com").await;

        assert!(matches!(result, Err(InternalError::ExpiryOutOfRange { .. })));
        let stored = verification_code::Entity::find().all(&db).await.unwrap();
        assert!(stored.is_empty());
        assert!(mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_creates_user_and_verified_binding() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let stored = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();

        let user = identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &stored.code)
            .await
            .unwrap();

        assert_eq!(user.email, "a@example.com");
        let bindings = identity.list_phone_bindings(&db, &user.id).await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].verified);
        let owner = identity.find_user_by_phone(&db, "3413413413").await.unwrap().unwrap();
        assert_eq!(owner.id, user.id);
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let stored = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();

        identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &stored.code)
            .await
            .unwrap();
        let replay = identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &stored.code)
            .await;

        assert_identity_error(replay, |e| matches!(e, IdentityError::InvalidOrExpiredCode));
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let db = setup_test_db().await;
        let (clock, _mail, identity) = test_identity_provider();
        let stored = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();

        clock.advance(chrono::Duration::minutes(10));
        let result = identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &stored.code)
            .await;

        assert_identity_error(result, |e| matches!(e, IdentityError::InvalidOrExpiredCode));
    }

    #[tokio::test]
    async fn test_code_does_not_match_other_pair() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let stored = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();

        let wrong_email = identity
            .redeem_phone_binding(&db, "b@example.com", "3413413413", &stored.code)
            .await;
        let wrong_phone = identity
            .redeem_phone_binding(&db, "a@example.com", "3410000000", &stored.code)
            .await;

        assert_identity_error(wrong_email, |e| matches!(e, IdentityError::InvalidOrExpiredCode));
        assert_identity_error(wrong_phone, |e| matches!(e, IdentityError::InvalidOrExpiredCode));
    }

    #[tokio::test]
    async fn test_phone_bound_to_other_user_leaves_code_unused() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let first = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();
        identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &first.code)
            .await
            .unwrap();

        let second = identity.request_phone_binding(&db, "3413413413", "b@example.com").await.unwrap();
        let result = identity
            .redeem_phone_binding(&db, "b@example.com", "3413413413", &second.code)
            .await;

        assert_identity_error(result, |e| matches!(e, IdentityError::PhoneAlreadyBound(_)));
        let code = VerificationCodeStore::new().find_by_id(&db, second.id).await.unwrap().unwrap();
        assert!(code.used_at.is_none());
        assert!(identity.find_by_email(&db, "b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redeem_rejects_disabled_user() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();
        identity.set_disabled(&db, &user.id, true).await.unwrap();
        let stored = identity.request_phone_binding(&db, "3413413413", "a@example.com").await.unwrap();

        let result = identity
            .redeem_phone_binding(&db, "a@example.com", "3413413413", &stored.code)
            .await;

        assert_identity_error(result, |e| matches!(e, IdentityError::UserDisabled(_)));
        assert!(identity.find_user_by_phone(&db, "3413413413").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_removes_links() {
        let db = setup_test_db().await;
        let (_clock, _mail, identity) = test_identity_provider();
        let user = identity.get_or_create_by_email(&db, "a@example.com").await.unwrap();
        identity
            .link_or_update_external_account(&db, &user, AuthProvider::Google, &google_profile("g-1"))
            .await
            .unwrap();

        identity.delete_user(&db, &user.id).await.unwrap();

        assert!(identity.find_by_id(&db, &user.id).await.unwrap().is_none());
        assert!(identity.list_social_accounts(&db, &user.id).await.unwrap().is_empty());
        assert_identity_error(identity.delete_user(&db, &user.id).await, |e| {
            matches!(e, IdentityError::UserNotFound(_))
        });
    }
}
