use crate::config::types::HarvestConfig;
use crate::ConfigError;

/// Validates the entire configuration
///
/// Rejects configurations no run could act on. This is the only place a
/// user mistake turns into a fatal error; everything past validation is
/// recovered page by page.
pub fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_list_id(&config.list_id)?;
    validate_page_range(config)?;
    validate_timing(config)?;
    Ok(())
}

/// Validates the list identifier
fn validate_list_id(list_id: &str) -> Result<(), ConfigError> {
    if list_id.is_empty() {
        return Err(ConfigError::Validation(
            "list_id cannot be empty".to_string(),
        ));
    }

    // The id is spliced into a URL path segment and the output filename
    if list_id.contains('/') || list_id.contains('\\') || list_id.contains("..") {
        return Err(ConfigError::Validation(format!(
            "list_id must not contain path separators, got '{}'",
            list_id
        )));
    }

    Ok(())
}

/// Validates the page range
fn validate_page_range(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must not be smaller than start_page ({})",
            config.end_page, config.start_page
        )));
    }

    Ok(())
}

/// Validates delays and timeouts
fn validate_timing(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.rate_limit_wait_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_wait_secs must be >= 1, got {}",
            config.rate_limit_wait_secs
        )));
    }

    if let Some(0) = config.rate_limit_max_retries {
        return Err(ConfigError::Validation(
            "rate_limit_max_retries must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
