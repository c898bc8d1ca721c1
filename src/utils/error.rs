use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Invalid target URL {url}: {source}")]
    TargetUrlError {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("unexpected error code: {status} {url}")]
    UnexpectedStatusError { status: u16, url: String },

    #[error("Metrics registry error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Where in the poll or process lifecycle an error arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RequestConstruction,
    Transport,
    Status,
    BodyRead,
    Configuration,
    Server,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::RequestConstruction => "request_construction",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Status => "status",
            ErrorCategory::BodyRead => "body_read",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Server => "server",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExporterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExporterError::TargetUrlError { .. } => ErrorCategory::RequestConstruction,
            ExporterError::RequestError(e) => {
                if e.is_builder() {
                    ErrorCategory::RequestConstruction
                } else if e.is_timeout() {
                    ErrorCategory::Transport
                } else if e.is_body() || e.is_decode() {
                    ErrorCategory::BodyRead
                } else {
                    ErrorCategory::Transport
                }
            }
            ExporterError::UnexpectedStatusError { .. } => ErrorCategory::Status,
            ExporterError::MetricsError(_) | ExporterError::IoError(_) => ErrorCategory::Server,
            ExporterError::TomlError(_) | ExporterError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::RequestConstruction => "Check the --url, --year and --location values",
            ErrorCategory::Transport => {
                "Check network connectivity to the event site or raise --timeout-seconds"
            }
            ErrorCategory::Status => "The event page may not exist yet; check --year and --location",
            ErrorCategory::BodyRead => "The upstream connection dropped mid-response; it will be retried on the next scrape",
            ErrorCategory::Configuration => "Fix the configuration flag, environment variable or config file",
            ErrorCategory::Server => "Check that the listen address is free and reachable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
