use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ConfigError, RelayError, Result};

/// Environment variable naming an optional YAML config file. When unset the
/// configuration is read from individual environment variables.
pub const CONFIG_FILE_ENV: &str = "RELAY_CONFIG_FILE";

/// Settings for the archive-deleted function.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    pub delivery_stream_name: String,
    pub batch_size: usize,
    #[serde(default)]
    pub missing_image_policy: MissingImagePolicy,
    #[serde(default)]
    pub client: ClientOptions,
}

/// Settings for the record-data function.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordConfig {
    pub table_name: String,
    /// Seconds added to the record timestamp to form its expiry attribute.
    pub record_ttl: Decimal,
    #[serde(default)]
    pub client: ClientOptions,
}

/// Overrides applied on top of the default AWS config chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientOptions {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

/// What to do with a REMOVE event that has no `OldImage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingImagePolicy {
    /// Fail the invocation so the trigger redelivers the batch.
    #[default]
    Fail,
    /// Drop the event and count it as skipped.
    Skip,
}

impl FromStr for MissingImagePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MissingImagePolicy::Fail),
            "skip" => Ok(MissingImagePolicy::Skip),
            other => Err(ConfigError::Invalid {
                message: format!("unknown missing image policy '{other}'"),
            }),
        }
    }
}

/// Shared loading behaviour for the per-function configs.
pub trait RelayConfig: DeserializeOwned + Sized {
    /// Builds the config from a key lookup, normally the process environment.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>;

    fn validate(&self) -> Result<()>;

    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_string(),
            error: Box::new(e),
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Loads and validates a config from `config_path` if given, else from the environment.
pub fn load_config<C: RelayConfig>(config_path: Option<&str>) -> Result<C> {
    let config = match config_path {
        Some(path) => C::from_file(path)?,
        None => C::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingField {
            field: key.to_string(),
        }
        .into()),
    }
}

fn client_options<F>(lookup: &F) -> ClientOptions
where
    F: Fn(&str) -> Option<String>,
{
    ClientOptions {
        region: lookup("RELAY_REGION").filter(|v| !v.is_empty()),
        endpoint_url: lookup("RELAY_ENDPOINT_URL").filter(|v| !v.is_empty()),
    }
}

/// Parses a decimal in plain (`3600`, `3600.5`) or scientific (`3.6e3`) notation.
pub fn parse_decimal(raw: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    let raw = raw.trim();
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw))
}

impl RelayConfig for ArchiveConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delivery_stream_name = required(&lookup, "FIREHOSE_NAME")?;
        let raw_batch_size = required(&lookup, "BATCH_SIZE")?;
        let batch_size = raw_batch_size
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::Invalid {
                message: format!("BATCH_SIZE '{raw_batch_size}' is not a positive integer: {e}"),
            })?;
        let missing_image_policy = match lookup("MISSING_IMAGE_POLICY") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => MissingImagePolicy::default(),
        };

        Ok(Self {
            delivery_stream_name,
            batch_size,
            missing_image_policy,
            client: client_options(&lookup),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.delivery_stream_name.trim().is_empty() {
            return Err(validation("Delivery stream name cannot be empty"));
        }
        if self.batch_size == 0 {
            return Err(validation("Batch size must be at least 1"));
        }
        Ok(())
    }
}

impl RelayConfig for RecordConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = required(&lookup, "TABLE_NAME")?;
        let raw_ttl = required(&lookup, "RECORD_TTL")?;
        let record_ttl = parse_decimal(&raw_ttl).map_err(|e| ConfigError::Invalid {
            message: format!("RECORD_TTL '{raw_ttl}' is not a number: {e}"),
        })?;

        Ok(Self {
            table_name,
            record_ttl,
            client: client_options(&lookup),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(validation("Table name cannot be empty"));
        }
        if self.record_ttl.is_sign_negative() && !self.record_ttl.is_zero() {
            return Err(validation("Record TTL cannot be negative"));
        }
        Ok(())
    }
}

fn validation(reason: &str) -> RelayError {
    ConfigError::ValidationFailed {
        reason: reason.to_string(),
    }
    .into()
}
