// src/config.rs
// Environment-driven configuration for retry policy and logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::retry::RetryConfig;

pub const ENV_ENVIRONMENT: &str = "SOCRATICA_ENV";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "SOCRATICA_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_INITIAL_DELAY_MS: &str = "SOCRATICA_RETRY_INITIAL_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "SOCRATICA_RETRY_MAX_DELAY_MS";
pub const ENV_RETRY_BACKOFF_MULTIPLIER: &str = "SOCRATICA_RETRY_BACKOFF_MULTIPLIER";
pub const ENV_LOG_FORMAT: &str = "SOCRATICA_LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "SOCRATICA_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "console" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) => value
                .parse::<Environment>()
                .with_context(|| format!("parsing {}", ENV_ENVIRONMENT))?,
            None => Environment::Development,
        };

        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_attempts: parse_or(&lookup, ENV_RETRY_MAX_ATTEMPTS, defaults.max_attempts)?,
            initial_delay_ms: parse_or(&lookup, ENV_RETRY_INITIAL_DELAY_MS, defaults.initial_delay_ms)?,
            max_delay_ms: parse_or(&lookup, ENV_RETRY_MAX_DELAY_MS, defaults.max_delay_ms)?,
            backoff_multiplier: parse_or(&lookup, ENV_RETRY_BACKOFF_MULTIPLIER, defaults.backoff_multiplier)?,
        };
        retry.validate().context("validating retry configuration")?;

        let format = match lookup(ENV_LOG_FORMAT) {
            Some(value) => value
                .parse::<LogFormat>()
                .with_context(|| format!("parsing {}", ENV_LOG_FORMAT))?,
            None if environment == Environment::Production => LogFormat::Json,
            None => LogFormat::Pretty,
        };
        let level = lookup(ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string());

        Ok(Self {
            environment,
            retry,
            logging: LoggingConfig { format, level },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            retry: RetryConfig::default(),
            logging: LoggingConfig {
                format: LogFormat::Pretty,
                level: "info".to_string(),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value {:?} for {}", raw, key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_ENVIRONMENT, "prod"),
            (ENV_RETRY_MAX_ATTEMPTS, "5"),
            (ENV_RETRY_INITIAL_DELAY_MS, "250"),
            (ENV_RETRY_MAX_DELAY_MS, "4000"),
            (ENV_RETRY_BACKOFF_MULTIPLIER, "1.5"),
            (ENV_LOG_LEVEL, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.retry, RetryConfig::new(5, 250, 4000, 1.5).unwrap());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unparsable_value_is_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_RETRY_MAX_ATTEMPTS, "three")])).unwrap_err();
        assert!(format!("{:#}", err).contains(ENV_RETRY_MAX_ATTEMPTS));
    }

    #[test]
    fn test_invalid_retry_config_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (ENV_RETRY_INITIAL_DELAY_MS, "9000"),
            (ENV_RETRY_MAX_DELAY_MS, "1000"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_environment() {
        assert_eq!(
            "qa".parse::<Environment>(),
            Err(ConfigError::UnknownEnvironment("qa".to_string()))
        );
        assert!(AppConfig::from_lookup(lookup_from(&[(ENV_ENVIRONMENT, "qa")])).is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("console".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
