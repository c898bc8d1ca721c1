use crate::utils::error::{ExporterError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Only absolute `http`/`https` URLs can be fetched.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let invalid = |reason: String| ExporterError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason,
    };

    if url_str.is_empty() {
        return Err(invalid("URL cannot be empty".to_string()));
    }

    let url = Url::parse(url_str).map_err(|e| invalid(format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("Unsupported URL scheme: {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL must name a host".to_string()));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExporterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ExporterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Accepts `host:port`, `[v6]:port` and the bare `:port` form.
pub fn validate_listen_address(field_name: &str, address: &str) -> Result<()> {
    let invalid = |reason: &str| ExporterError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: address.to_string(),
        reason: reason.to_string(),
    };

    let (_, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("Address must include a port, e.g. :9019"))?;

    if port.parse::<u16>().is_err() {
        return Err(invalid("Port must be a number between 0 and 65535"));
    }
    Ok(())
}
