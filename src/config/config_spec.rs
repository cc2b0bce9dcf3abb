use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValueSource {
    EnvironmentVariable { name: String },
    Default,
}

#[derive(Debug, Clone)]
pub struct ConfigValue {
    pub value: String,
    pub source: ConfigValueSource,
}

/// Configuration specification with environment variable → default priority
pub struct ConfigSpec {
    env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    pub env_override: Option<String>,
    pub default_value: Option<String>,
    pub required: bool,
    pub min_length: Option<usize>,
    pub validator: Option<fn(&str) -> Result<(), String>>,
}

impl ConfigSpec {
    pub fn new(env_provider: Arc<dyn EnvironmentProvider + Send + Sync>) -> Self {
        Self {
            env_provider,
            env_override: None,
            default_value: None,
            required: false,
            min_length: None,
            validator: None,
        }
    }

    pub fn env_override(mut self, name: &str) -> Self {
        self.env_override = Some(name.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    /// Load a setting value with source tracking
    ///
    /// The environment variable wins when present; otherwise the default is used.
    pub fn load_setting_with_source(&self) -> Result<ConfigValue, ConfigError> {
        let setting_name = self.setting_name();

        if let Some(env_var) = &self.env_override {
            if let Some(value) = self.env_provider.get_var(env_var) {
                self.validate_value(&value, &setting_name)?;
                return Ok(ConfigValue {
                    value,
                    source: ConfigValueSource::EnvironmentVariable {
                        name: env_var.clone(),
                    },
                });
            }
        }

        if let Some(default) = &self.default_value {
            self.validate_value(default, &setting_name)?;
            return Ok(ConfigValue {
                value: default.clone(),
                source: ConfigValueSource::Default,
            });
        }

        if self.required {
            return Err(ConfigError::InvalidSetting {
                setting_name,
                reason: "Required setting has no value from any source".to_string(),
            });
        }

        Ok(ConfigValue {
            value: String::new(),
            source: ConfigValueSource::Default,
        })
    }

    /// Validate a setting value according to the ConfigSpec rules
    pub fn validate_value(&self, value: &str, setting_name: &str) -> Result<(), ConfigError> {
        if let Some(min_len) = self.min_length {
            if value.len() < min_len {
                return Err(ConfigError::InvalidSetting {
                    setting_name: setting_name.to_string(),
                    reason: format!("Value must be at least {} characters long", min_len),
                });
            }
        }

        if let Some(validator) = self.validator {
            validator(value).map_err(|reason| ConfigError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason,
            })?;
        }

        Ok(())
    }

    fn setting_name(&self) -> String {
        self.env_override
            .clone()
            .unwrap_or_else(|| "unknown_setting".to_string())
    }
}

/// Type parsing utilities for configuration values
impl ConfigSpec {
    /// Parse a strictly positive integer
    ///
    /// # Arguments
    /// * `value` - String value to parse (e.g., "30")
    /// * `setting_name` - Name of the setting for error messages
    pub fn parse_positive_int(value: &str, setting_name: &str) -> Result<i64, ConfigError> {
        let parsed = value.trim().parse::<i64>().map_err(|e| ConfigError::ParseError {
            setting_name: setting_name.to_string(),
            error: format!("Expected positive integer, got '{}': {}", value, e),
        })?;

        if parsed <= 0 {
            return Err(ConfigError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason: format!("Must be greater than zero, got {}", parsed),
            });
        }

        Ok(parsed)
    }

    /// Parse a duration value in minutes from string
    pub fn parse_duration_minutes(
        value: &str,
        setting_name: &str,
    ) -> Result<chrono::Duration, ConfigError> {
        let minutes = Self::parse_positive_int(value, setting_name)?;
        chrono::Duration::try_minutes(minutes).ok_or_else(|| ConfigError::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: format!("{} minutes is out of range", minutes),
        })
    }

    /// Parse a duration value in days from string
    pub fn parse_duration_days(
        value: &str,
        setting_name: &str,
    ) -> Result<chrono::Duration, ConfigError> {
        let days = Self::parse_positive_int(value, setting_name)?;
        chrono::Duration::try_days(days).ok_or_else(|| ConfigError::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: format!("{} days is out of range", days),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    fn spec(env: MockEnvironment) -> ConfigSpec {
        ConfigSpec::new(Arc::new(env))
    }

    #[test]
    fn test_env_var_overrides_default() {
        let value = spec(MockEnvironment::empty().with_var("ALGORITHM", "HS512"))
            .env_override("ALGORITHM")
            .default_value("HS256")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "HS512");
        assert_eq!(
            value.source,
            ConfigValueSource::EnvironmentVariable {
                name: "ALGORITHM".to_string()
            }
        );
    }

    #[test]
    fn test_default_used_when_env_var_absent() {
        let value = spec(MockEnvironment::empty())
            .env_override("ALGORITHM")
            .default_value("HS256")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "HS256");
        assert_eq!(value.source, ConfigValueSource::Default);
    }

    #[test]
    fn test_required_setting_without_value_fails() {
        let result = spec(MockEnvironment::empty())
            .env_override("DATABASE_URL")
            .required(true)
            .load_setting_with_source();

        match result {
            Err(ConfigError::InvalidSetting { setting_name, .. }) => {
                assert_eq!(setting_name, "DATABASE_URL");
            }
            _ => panic!("Expected InvalidSetting error"),
        }
    }

    #[test]
    fn test_validator_rejects_env_value() {
        let result = spec(MockEnvironment::empty().with_var("ALGORITHM", "RS256"))
            .env_override("ALGORITHM")
            .validator(|v| {
                if v.starts_with("HS") {
                    Ok(())
                } else {
                    Err("HMAC algorithms only".to_string())
                }
            })
            .load_setting_with_source();

        assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
    }

    #[test]
    fn test_parse_positive_int() {
        assert_eq!(ConfigSpec::parse_positive_int("30", "X").unwrap(), 30);
        assert!(matches!(
            ConfigSpec::parse_positive_int("0", "X"),
            Err(ConfigError::InvalidSetting { .. })
        ));
        assert!(matches!(
            ConfigSpec::parse_positive_int("-5", "X"),
            Err(ConfigError::InvalidSetting { .. })
        ));
        assert!(matches!(
            ConfigSpec::parse_positive_int("thirty", "X"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(
            ConfigSpec::parse_duration_minutes("10", "X").unwrap(),
            chrono::Duration::minutes(10)
        );
        assert_eq!(
            ConfigSpec::parse_duration_days("7", "X").unwrap(),
            chrono::Duration::days(7)
        );
    }
}
