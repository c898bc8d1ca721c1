use crate::config::ExporterConfig;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line surface. Every setting is optional here so that a config file
/// can supply it; precedence is flag, then environment, then file, then default.
#[derive(Debug, Clone, Parser)]
#[command(name = "promcon_registration_exporter")]
#[command(about = "Exports whether PromCon registration is open as a Prometheus metric")]
#[command(version)]
pub struct CliConfig {
    #[arg(long, env = "PROMCON_EXPORTER_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "PROMCON_LISTEN_ADDRESS",
        help = "The address to listen on for HTTP requests [default: :9019]"
    )]
    pub listen_address: Option<String>,

    #[arg(
        long,
        env = "PROMCON_LOCATION",
        help = "The location of promcon [default: Munich]"
    )]
    pub location: Option<String>,

    #[arg(long, env = "PROMCON_YEAR", help = "The year of promcon [default: 2019]")]
    pub year: Option<String>,

    #[arg(
        long,
        env = "PROMCON_URL",
        help = "The URL to watch for registration [default: https://promcon.io]"
    )]
    pub url: Option<String>,

    #[arg(
        long,
        env = "PROMCON_TIMEOUT_SECONDS",
        help = "Upstream request timeout in seconds [default: 10]"
    )]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact", env = "PROMCON_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Merge flags over the optional config file and the built-in defaults.
    pub fn resolve(&self) -> Result<ExporterConfig> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };

        if let Some(listen_address) = &self.listen_address {
            config.listen_address = listen_address.clone();
        }
        if let Some(location) = &self.location {
            config.location = location.clone();
        }
        if let Some(year) = &self.year {
            config.year = year.clone();
        }
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.timeout_seconds = timeout_seconds;
        }

        Ok(config)
    }
}
