use std::fmt;
use std::sync::Arc;

use crate::config::{EnvironmentProvider, SystemEnvironment};

/// Environment variable name and minimum length of a secret
struct SecretRule {
    name: &'static str,
    min_length: usize,
}

const SIGNING_SECRET: SecretRule = SecretRule {
    name: "SECRET_KEY",
    min_length: 32,
};

/// Custom error type for secret-related failures
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Centralized manager for application secrets
pub struct SecretManager {
    signing_secret: String,
}

impl SecretManager {
    /// Initialize the SecretManager from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn init() -> Result<Self, SecretError> {
        Self::init_with_provider(Arc::new(SystemEnvironment))
    }

    /// Initialize the SecretManager from the given environment provider
    pub fn init_with_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, SecretError> {
        let signing_secret = Self::load_secret(env_provider.as_ref(), &SIGNING_SECRET)?;

        Ok(Self { signing_secret })
    }

    /// Get the token signing secret
    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }

    /// Load a required secret and enforce its minimum length
    fn load_secret(
        env_provider: &(dyn EnvironmentProvider + Send + Sync),
        rule: &SecretRule,
    ) -> Result<String, SecretError> {
        let value = env_provider
            .get_var(rule.name)
            .ok_or_else(|| SecretError::missing(rule.name))?;

        if value.len() < rule.min_length {
            return Err(SecretError::invalid_length(rule.name, rule.min_length, value.len()));
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("signing_secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 1 }}")
    }
}
