use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{AuthSettings, SecretManager};
use crate::errors::InternalError;
use crate::providers::{
    ClockProvider, EmailDispatcher, IdentityProvider, LogOnlyEmailDispatcher, SystemClock,
    TokenCodec, TokenProvider,
};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ↓ creates once
///   ├─ db (DatabaseConnection)
///   ├─ secret_manager (Arc<SecretManager>)
///   ├─ clock (Arc<dyn ClockProvider>)
///   ├─ token_provider (Arc<TokenProvider>)
///   └─ identity_provider (Arc<IdentityProvider>)
///   ↓ wrapped in Arc<AppData>
///   ↓ passed to coordinators
///   ├─ AuthCoordinator::new(app_data)
///   └─ PhoneBindingCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: AuthSettings,
    pub secret_manager: Arc<SecretManager>,
    pub clock: Arc<dyn ClockProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub identity_provider: Arc<IdentityProvider>,
}

impl AppData {
    /// Initialize all application data with the system clock
    ///
    /// The database should be connected and migrated before calling this.
    /// Outbound email is logged, not sent.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` when secret manager initialization fails
    pub async fn init(db: DatabaseConnection, settings: AuthSettings) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        tracing::debug!("Initializing secret manager...");
        let secret_manager = Arc::new(SecretManager::init().map_err(|e| {
            InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e))
        })?);
        tracing::debug!("Secret manager initialized");

        let app_data = Self::from_parts(
            db,
            settings,
            secret_manager,
            Arc::new(SystemClock),
            Arc::new(LogOnlyEmailDispatcher),
        );

        tracing::info!("AppData initialization complete");

        Ok(app_data)
    }

    /// Assemble application data from already constructed parts
    pub fn from_parts(
        db: DatabaseConnection,
        settings: AuthSettings,
        secret_manager: Arc<SecretManager>,
        clock: Arc<dyn ClockProvider>,
        dispatcher: Arc<dyn EmailDispatcher>,
    ) -> Self {
        let lifetimes = settings.lifetimes();

        let codec = TokenCodec::new(secret_manager.signing_secret(), settings.algorithm());
        let token_provider = Arc::new(TokenProvider::new(codec, lifetimes, clock.clone()));
        let identity_provider = Arc::new(IdentityProvider::new(
            clock.clone(),
            dispatcher,
            lifetimes.phone_code,
        ));

        tracing::debug!(algorithm = ?settings.algorithm(), "Providers created");

        Self {
            db,
            settings,
            secret_manager,
            clock,
            token_provider,
            identity_provider,
        }
    }
}
