// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use migration::{IdentityMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{AuthSettings, MockEnvironment, SecretManager, TokenLifetimes};
use crate::providers::{
    EmailDispatcher, IdentityProvider, ManualClock, RecordingEmailDispatcher, TokenCodec,
    TokenProvider,
};
use crate::types::internal::ProviderProfile;

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// Creates an in-memory database with all migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    IdentityMigrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Manual clock pinned to 2025-03-01 12:00:00 UTC
pub fn test_clock() -> Arc<ManualClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid test instant");
    Arc::new(ManualClock::new(start))
}

pub fn test_token_provider(clock: Arc<ManualClock>) -> TokenProvider {
    TokenProvider::new(
        TokenCodec::new(TEST_SECRET, jsonwebtoken::Algorithm::HS256),
        TokenLifetimes::default(),
        clock,
    )
}

/// Identity provider wired to a manual clock and a recording dispatcher
pub fn test_identity_provider() -> (Arc<ManualClock>, Arc<RecordingEmailDispatcher>, IdentityProvider) {
    let clock = test_clock();
    let mail = Arc::new(RecordingEmailDispatcher::new());
    let identity = IdentityProvider::new(
        clock.clone(),
        mail.clone(),
        TokenLifetimes::default().phone_code,
    );
    (clock, mail, identity)
}

pub fn google_profile(provider_id: &str) -> ProviderProfile {
    ProviderProfile {
        provider_id: provider_id.to_string(),
        email: "a@example.com".to_string(),
        email_verified: true,
        name: Some("Alice Example".to_string()),
        given_name: Some("Alice".to_string()),
        family_name: Some("Example".to_string()),
        picture: Some("https://example.com/a.png".to_string()),
    }
}

/// Full application data over an in-memory database
///
/// Returns (app_data, clock, recording dispatcher).
pub async fn setup_test_app_data() -> (Arc<AppData>, Arc<ManualClock>, Arc<RecordingEmailDispatcher>) {
    let db = setup_test_db().await;
    let clock = test_clock();
    let mail = Arc::new(RecordingEmailDispatcher::new());

    let settings = AuthSettings::new(
        jsonwebtoken::Algorithm::HS256,
        TokenLifetimes::default(),
        "sqlite::memory:".to_string(),
    );
    let env = MockEnvironment::empty().with_var("SECRET_KEY", TEST_SECRET);
    let secret_manager = Arc::new(
        SecretManager::init_with_provider(Arc::new(env)).expect("Failed to initialize test SecretManager"),
    );
    let dispatcher: Arc<dyn EmailDispatcher> = mail.clone();

    let app_data = Arc::new(AppData::from_parts(
        db,
        settings,
        secret_manager,
        clock.clone(),
        dispatcher,
    ));

    (app_data, clock, mail)
}
