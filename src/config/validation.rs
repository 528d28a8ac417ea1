use crate::config::types::{ClientConfig, Config, CrawlerConfig, OutputConfig, StateConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

/// Smallest timeout accepted for navigation and selector waits (milliseconds)
const MIN_TIMEOUT_MS: u64 = 100;

/// Largest listing page size the site serves
const MAX_PAGE_SIZE: u32 = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_crawler_config(&config.crawler)?;
    validate_client_config(&config.client)?;
    validate_state_config(&config.state)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.site_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "site-url '{}' must use http or https",
            config.site_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "site-url '{}' has no host",
            config.site_url
        )));
    }

    validate_identifier("problem-id", &config.problem_id)?;
    validate_identifier("category", &config.category)?;

    if config.language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "language cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    config.listing_url()?;

    Ok(())
}

/// Validates crawler limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.navigation_timeout < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.navigation_timeout
        )));
    }

    if config.selector_timeout < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "selector-timeout must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.selector_timeout
        )));
    }

    Ok(())
}

/// Validates client identity
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(var) = &config.session_cookie_env {
        if var.is_empty() || var.contains('=') {
            return Err(ConfigError::Validation(format!(
                "session-cookie-env '{}' is not a valid environment variable name",
                var
            )));
        }
    }

    Ok(())
}

fn validate_state_config(config: &StateConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "state directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.solutions_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "solutions-directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Problem and category codes end up in URLs and directory names
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "{} must contain only ASCII letters, digits, '_' or '-', got '{}'",
            field, value
        )));
    }

    Ok(())
}
