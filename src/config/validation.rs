use crate::config::types::{
    BrowserConfig, HttpConfig, PaginationConfig, SelectorConfig, SweepConfig, TargetConfig,
};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &SweepConfig) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_selector_config(&config.selectors)?;
    validate_http_config(&config.http)?;
    validate_browser_config(&config.browser)?;
    validate_pagination_config(&config.pagination)?;
    validate_output_path(config.output.csv_path.as_deref())?;
    Ok(())
}

/// Compiles a CSS selector, reporting failures as configuration errors
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Validates the search feed description
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_http_url("search-url", &config.search_url)?;
    validate_http_url("base-url", &config.base_url)?;

    if !config.product_path.is_empty() && !config.product_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "product-path must start with '/', got '{}'",
            config.product_path
        )));
    }

    if config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "page-param cannot be empty".to_string(),
        ));
    }

    if config.currency_symbol.is_empty() {
        return Err(ConfigError::Validation(
            "currency-symbol cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a URL and requires an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates selectors and the "no results" marker
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.product_item,
        &config.name,
        &config.price,
        &config.mpn,
        &config.product_link,
        &config.no_results_tag,
    ] {
        compile_selector(selector)?;
    }

    if !config
        .no_results_tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "no-results-tag must be a plain tag name, got '{}'",
            config.no_results_tag
        )));
    }

    if config.no_results_text.trim().is_empty() {
        return Err(ConfigError::Validation(
            "no-results-text cannot be empty".to_string(),
        ));
    }

    // The marker text is embedded in a single-quoted XPath literal
    if config.no_results_text.contains('\'') {
        return Err(ConfigError::Validation(format!(
            "no-results-text cannot contain single quotes, got '{}'",
            config.no_results_text
        )));
    }

    Ok(())
}

/// Validates HTTP strategy settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates browser strategy settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_http_url("webdriver-url", &config.webdriver_url)?;

    if config.render_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "render-timeout-secs must be >= 1, got {}",
            config.render_timeout_secs
        )));
    }

    if config.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms must be >= 1, got {}",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates pagination limits
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-empty-pages must be >= 1, got {}",
            config.max_empty_pages
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_path(path: Option<&str>) -> Result<(), ConfigError> {
    if matches!(path, Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
