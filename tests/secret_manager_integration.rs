mod common;

use std::sync::Arc;

use identity_backend::config::{AuthSettings, ConfigError, SecretError, SecretManager};

#[test]
fn test_application_startup_with_valid_secret() {
    let _lock = common::ENV_TEST_MUTEX.lock().unwrap();
    let _guard = common::EnvGuard::new(vec!["SECRET_KEY"]);

    unsafe {
        std::env::set_var("SECRET_KEY", "this-is-a-valid-signing-secret-with-32-chars");
    }

    let secret_manager = SecretManager::init().expect("SecretManager should initialize");

    assert_eq!(secret_manager.signing_secret(), "this-is-a-valid-signing-secret-with-32-chars");
    assert!(!format!("{:?}", secret_manager).contains("this-is-a-valid"));
}

#[test]
fn test_application_fails_gracefully_with_missing_secret() {
    let _lock = common::ENV_TEST_MUTEX.lock().unwrap();
    let _guard = common::EnvGuard::new(vec!["SECRET_KEY"]);

    let err = SecretManager::init().unwrap_err();

    match err {
        SecretError::Missing { secret_name } => assert_eq!(secret_name, "SECRET_KEY"),
        other => panic!("Expected Missing error, got {:?}", other),
    }
}

#[test]
fn test_short_secret_is_rejected() {
    let env = common::StaticEnvironment::new(&[("SECRET_KEY", "too-short")]);

    let err = SecretManager::init_with_provider(Arc::new(env)).unwrap_err();

    assert!(matches!(err, SecretError::InvalidLength { .. }));
}

#[test]
fn test_settings_reject_non_hmac_algorithm() {
    let env = common::StaticEnvironment::new(&[("ALGORITHM", "RS256")]);

    let result = AuthSettings::from_env_provider(Arc::new(env));

    assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
}

#[test]
fn test_settings_parse_overrides() {
    let env = common::StaticEnvironment::new(&[
        ("ALGORITHM", "HS512"),
        ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
        ("REFRESH_TOKEN_EXPIRE_DAYS", "1"),
    ]);

    let settings = AuthSettings::from_env_provider(Arc::new(env)).unwrap();

    assert_eq!(settings.algorithm(), jsonwebtoken::Algorithm::HS512);
    assert_eq!(settings.lifetimes().access, chrono::Duration::minutes(15));
    assert_eq!(settings.lifetimes().refresh, chrono::Duration::days(1));
}
