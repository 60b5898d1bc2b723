//! Configuration management for AlertPolicy

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::AccountId;
use crate::policies::BackendRouting;

/// Environment variable prefix, e.g. `ALERTPOLICY__API__API_KEY`
pub const ENV_PREFIX: &str = "ALERTPOLICY";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint and credential configuration
    pub api: ApiConfig,

    /// Backend chosen for each policy operation
    pub routing: BackendRouting,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the
    /// environment, later sources overriding earlier ones.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check that the settings are usable for talking to the platform
    pub fn validate(&self) -> Result<()> {
        if self.api.api_key.trim().is_empty() {
            return Err(Error::config("api.api_key is required"));
        }
        if self.api.timeout.is_zero() {
            return Err(Error::config("api.timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Platform region, which decides the default endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States data center
    #[default]
    Us,
    /// European data center
    Eu,
}

/// Endpoint and credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub rest_url: String,
    /// NerdGraph endpoint
    pub nerdgraph_url: String,
    /// User API key sent in the `Api-Key` header
    pub api_key: String,
    /// Account used when none is given explicitly
    pub account_id: Option<AccountId>,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl ApiConfig {
    /// Default endpoints for a region
    pub fn for_region(region: Region) -> Self {
        let (rest_url, nerdgraph_url) = match region {
            Region::Us => (
                "https://api.newrelic.com/v2",
                "https://api.newrelic.com/graphql",
            ),
            Region::Eu => (
                "https://api.eu.newrelic.com/v2",
                "https://api.eu.newrelic.com/graphql",
            ),
        };

        Self {
            rest_url: rest_url.to_string(),
            nerdgraph_url: nerdgraph_url.to_string(),
            api_key: String::new(),
            account_id: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_region(Region::default())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
