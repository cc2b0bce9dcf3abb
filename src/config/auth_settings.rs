use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::Algorithm;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ConfigError;

/// Lifetimes of every token and code this service issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: chrono::Duration,
    pub refresh: chrono::Duration,
    pub email_verification: chrono::Duration,
    /// Lifetime of a phone verification code, reused for phone-verification tokens
    pub phone_code: chrono::Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: chrono::Duration::minutes(30),
            refresh: chrono::Duration::days(7),
            email_verification: chrono::Duration::minutes(5),
            phone_code: chrono::Duration::minutes(10),
        }
    }
}

/// Upper bound on any configured token or code lifetime
const MAX_LIFETIME_DAYS: i64 = 3650;

/// Settings for token issuance and storage, loaded from the environment
#[derive(Clone)]
pub struct AuthSettings {
    algorithm: Algorithm,
    lifetimes: TokenLifetimes,
    database_url: String,
}

impl AuthSettings {
    pub fn new(algorithm: Algorithm, lifetimes: TokenLifetimes, database_url: String) -> Self {
        Self {
            algorithm,
            lifetimes,
            database_url,
        }
    }

    /// Load settings through the given environment provider
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        let algorithm_spec = ConfigSpec::new(env_provider.clone())
            .env_override("ALGORITHM")
            .default_value("HS256")
            .validator(validate_hmac_algorithm);

        let access_spec = ConfigSpec::new(env_provider.clone())
            .env_override("ACCESS_TOKEN_EXPIRE_MINUTES")
            .default_value("30");

        let refresh_spec = ConfigSpec::new(env_provider.clone())
            .env_override("REFRESH_TOKEN_EXPIRE_DAYS")
            .default_value("7");

        let email_spec = ConfigSpec::new(env_provider.clone())
            .env_override("EMAIL_TOKEN_EXPIRE_MINUTES")
            .default_value("5");

        let phone_code_spec = ConfigSpec::new(env_provider.clone())
            .env_override("PHONE_EMAIL_CODE_EXPIRE_MINUTES")
            .default_value("10");

        let database_url_spec = ConfigSpec::new(env_provider)
            .env_override("DATABASE_URL")
            .default_value("sqlite://identity.db?mode=rwc")
            .min_length(1);

        let algorithm_value = algorithm_spec.load_setting_with_source()?.value;
        let algorithm = Algorithm::from_str(algorithm_value.trim()).map_err(|e| {
            ConfigError::ParseError {
                setting_name: "ALGORITHM".to_string(),
                error: e.to_string(),
            }
        })?;

        let lifetimes = TokenLifetimes {
            access: load_lifetime(access_spec, "ACCESS_TOKEN_EXPIRE_MINUTES", ConfigSpec::parse_duration_minutes)?,
            refresh: load_lifetime(refresh_spec, "REFRESH_TOKEN_EXPIRE_DAYS", ConfigSpec::parse_duration_days)?,
            email_verification: load_lifetime(
                email_spec,
                "EMAIL_TOKEN_EXPIRE_MINUTES",
                ConfigSpec::parse_duration_minutes,
            )?,
            phone_code: load_lifetime(
                phone_code_spec,
                "PHONE_EMAIL_CODE_EXPIRE_MINUTES",
                ConfigSpec::parse_duration_minutes,
            )?,
        };

        let database_url = database_url_spec.load_setting_with_source()?.value;

        Ok(Self {
            algorithm,
            lifetimes,
            database_url,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ConfigError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn load_lifetime(
    spec: ConfigSpec,
    setting_name: &str,
    parse: fn(&str, &str) -> Result<chrono::Duration, ConfigError>,
) -> Result<chrono::Duration, ConfigError> {
    let lifetime = parse(&spec.load_setting_with_source()?.value, setting_name)?;

    if lifetime > chrono::Duration::days(MAX_LIFETIME_DAYS) {
        return Err(ConfigError::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: format!("Must not exceed {} days", MAX_LIFETIME_DAYS),
        });
    }

    Ok(lifetime)
}

fn validate_hmac_algorithm(value: &str) -> Result<(), String> {
    match value.trim() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        other => Err(format!("Expected HS256, HS384 or HS512, got '{}'", other)),
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("algorithm", &self.algorithm)
            .field("lifetimes", &self.lifetimes)
            .field("database_url", &self.database_url)
            .finish()
    }
}
