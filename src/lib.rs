pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::HttpPageFetcher;
pub use config::ExporterConfig;
pub use crate::core::{RegistrationCollector, RegistrationStatus};
pub use utils::error::{ExporterError, Result};
