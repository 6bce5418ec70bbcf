use crate::config::types::{Config, HarvesterConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::output::OutputFormat;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvester_config(&config.harvester)?;
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetching and batching limits
pub fn validate_harvester_config(config: &HarvesterConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    // 2^retry grows fast; keep the exponent in a sane range
    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    validate_range("jitter", config.jitter_min_ms, config.jitter_max_ms)?;
    validate_range(
        "batch_pause",
        config.batch_pause_min_ms,
        config.batch_pause_max_ms,
    )?;

    if config.session_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "session_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_range(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min_ms ({}) must not exceed {}_max_ms ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// Validates the catalog location
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("root_url", &config.root_url)?;

    if !config.page_template.contains("{}") {
        return Err(ConfigError::Validation(format!(
            "page_template must contain a '{{}}' placeholder, got '{}'",
            config.page_template
        )));
    }

    let sample = config.page_template.replace("{}", "2");
    validate_http_url("page_template", &sample)?;

    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    config
        .format
        .parse::<OutputFormat>()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.csv_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.exchange_rate.is_nan() || config.exchange_rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "exchange_rate must be positive, got {}",
            config.exchange_rate
        )));
    }

    Ok(())
}
