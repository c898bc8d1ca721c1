#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_listen_address, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDRESS: &str = ":9019";
pub const DEFAULT_LOCATION: &str = "Munich";
pub const DEFAULT_YEAR: &str = "2019";
pub const DEFAULT_URL: &str = "https://promcon.io";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Resolved exporter settings. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    pub listen_address: String,
    pub location: String,
    pub year: String,
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            year: DEFAULT_YEAR.to_string(),
            url: DEFAULT_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ExporterConfig {
    /// Load settings from a TOML file. Keys missing from the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Socket address to bind. The bare `:port` form binds every interface.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }
}

impl ConfigProvider for ExporterConfig {
    fn base_url(&self) -> &str {
        &self.url
    }

    fn year(&self) -> &str {
        &self.year
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for ExporterConfig {
    fn validate(&self) -> Result<()> {
        validate_listen_address("listen_address", &self.listen_address)?;
        validate_non_empty_string("location", &self.location)?;
        validate_non_empty_string("year", &self.year)?;
        validate_url("url", &self.url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, MAX_TIMEOUT_SECONDS)?;
        Ok(())
    }
}
