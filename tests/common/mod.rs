// Common test utilities for integration tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use identity_backend::app_data::AppData;
use identity_backend::config::{AuthSettings, EnvironmentProvider, SecretManager, TokenLifetimes};
use identity_backend::providers::{EmailDispatcher, ManualClock, RecordingEmailDispatcher};
use migration::{IdentityMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

pub const TEST_SECRET: &str = "integration-secret-key-with-at-least-32-chars";

/// Global mutex for tests that touch the process environment
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

/// Environment provider backed by a fixed map
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new(vars: &[(&str, &str)]) -> Self {
        Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl EnvironmentProvider for StaticEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Creates a test database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    IdentityMigrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Migrated SQLite database in a temporary file, removed on drop
///
/// Unlike `sqlite::memory:`, a file database lets the pool hand out several
/// connections, so concurrent tasks really contend.
pub struct FileDatabase {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl FileDatabase {
    pub async fn create() -> Self {
        let path = std::env::temp_dir().join(format!("identity-test-{}.db", uuid::Uuid::new_v4().simple()));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let db = Database::connect(&url)
            .await
            .expect("Failed to create file-backed test database");
        IdentityMigrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        Self { db, path }
    }
}

impl Drop for FileDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub clock: Arc<ManualClock>,
    pub mail: Arc<RecordingEmailDispatcher>,
}

/// Full application over an in-memory database, a manual clock and a recording mailer
pub async fn setup_test_app() -> TestApp {
    let db = setup_test_db().await;
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("valid instant"),
    ));
    let mail = Arc::new(RecordingEmailDispatcher::new());

    let env = StaticEnvironment::new(&[("SECRET_KEY", TEST_SECRET)]);
    let secret_manager = Arc::new(
        SecretManager::init_with_provider(Arc::new(env)).expect("Failed to initialize SecretManager"),
    );
    let settings = AuthSettings::new(
        jsonwebtoken::Algorithm::HS256,
        TokenLifetimes::default(),
        "sqlite::memory:".to_string(),
    );
    let dispatcher: Arc<dyn EmailDispatcher> = mail.clone();

    let app_data = Arc::new(AppData::from_parts(
        db,
        settings,
        secret_manager,
        clock.clone(),
        dispatcher,
    ));

    TestApp {
        app_data,
        clock,
        mail,
    }
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.into_iter().map(String::from).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}
