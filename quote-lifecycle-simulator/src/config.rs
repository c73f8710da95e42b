use std::time::Duration;

use claim_lifecycle::{DEFAULT_TICKS_PER_NEW_CLAIM, SchedulerSettings};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    Missing(&'static str),

    #[error("Failed to convert '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub mod env_keys {
    pub const PG_HOST: &str = "PG_HOST";
    pub const PG_PORT: &str = "PG_PORT";
    pub const PG_USER: &str = "PG_USER";
    pub const PG_PASSWORD: &str = "PG_PASSWORD";
    pub const PG_DATABASE: &str = "PG_DATABASE";
    pub const TICK_MILLIS: &str = "TICK_MILLIS";
    pub const MOBILE_TEST_ROWS: &str = "MOBILE_TEST_ROWS";
    // Optional
    pub const SIMULATOR_SEED: &str = "SIMULATOR_SEED";
    pub const NEW_CLAIM_TICKS: &str = "NEW_CLAIM_TICKS";
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerSettings,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let database = DatabaseConfig {
            host: vars.string(env_keys::PG_HOST)?,
            port: vars.int(env_keys::PG_PORT)?,
            user: vars.string(env_keys::PG_USER)?,
            password: vars.string(env_keys::PG_PASSWORD)?,
            database: vars.string(env_keys::PG_DATABASE)?,
        };

        let ticks_per_new_claim = vars
            .optional_int(env_keys::NEW_CLAIM_TICKS)?
            .unwrap_or(DEFAULT_TICKS_PER_NEW_CLAIM);
        if ticks_per_new_claim == 0 {
            return Err(ConfigError::Invalid {
                key: env_keys::NEW_CLAIM_TICKS,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let scheduler = SchedulerSettings {
            tick_interval: Duration::from_millis(vars.int(env_keys::TICK_MILLIS)?),
            seed_claims: vars.int(env_keys::MOBILE_TEST_ROWS)?,
            ticks_per_new_claim,
        };

        Ok(Self {
            database,
            scheduler,
            seed: vars.optional_int(env_keys::SIMULATOR_SEED)?,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &'static str) -> Result<String, ConfigError> {
        (self.lookup)(key).ok_or(ConfigError::Missing(key))
    }

    fn int<T: TryFrom<u64>>(&self, key: &'static str) -> Result<T, ConfigError> {
        let value = self.string(key)?;
        parse_int(key, &value)
    }

    fn optional_int<T: TryFrom<u64>>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        (self.lookup)(key)
            .map(|value| parse_int(key, &value))
            .transpose()
    }
}

/// Parses an unsigned integer, accepting `0x`, `0o` and `0b` prefixes and
/// `_` separators. A bare leading zero selects octal, so `010` is 8.
fn parse_int<T: TryFrom<u64>>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim().replace('_', "");
    let (digits, radix) = match trimmed.get(..2) {
        Some("0x") | Some("0X") => (&trimmed[2..], 16),
        Some("0o") | Some("0O") => (&trimmed[2..], 8),
        Some("0b") | Some("0B") => (&trimmed[2..], 2),
        _ if trimmed.len() > 1 && trimmed.starts_with('0') => (&trimmed[1..], 8),
        _ => (trimmed.as_str(), 10),
    };

    let parsed = u64::from_str_radix(digits, radix).map_err(|e| invalid(e.to_string()))?;
    T::try_from(parsed).map_err(|_| invalid("value out of range".to_string()))
}
