use crate::config::types::{CrawlConfig, HttpConfig, MirrorConfig};
use crate::throttle::parse_rate;
use crate::ConfigError;

/// Upper bound for the link-handling pool
const MAX_POOL_SIZE: usize = 500;

/// Validates the entire configuration
pub fn validate(config: &MirrorConfig) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_POOL_SIZE, config.max_concurrency
        )));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    for extension in &config.reject_extensions {
        if extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Validation(format!(
                "reject entry '{}' names no extension",
                extension
            )));
        }
    }

    for pattern in &config.reject_paths {
        if !pattern.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "exclude pattern '{}' must start with '/'",
                pattern
            )));
        }
    }

    if let Some(rate) = &config.rate_limit {
        parse_rate(rate).map_err(|e| ConfigError::Validation(e.to_string()))?;
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&MirrorConfig::default()).is_ok());
    }

    #[test]
    fn test_pool_size_bounds() {
        let mut config = MirrorConfig::default();
        config.crawl.max_concurrency = 0;
        assert!(validate(&config).is_err());

        config.crawl.max_concurrency = MAX_POOL_SIZE + 1;
        assert!(validate(&config).is_err());

        config.crawl.max_concurrency = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_exclude_pattern_needs_leading_slash() {
        let mut config = MirrorConfig::default();
        config.crawl.reject_paths = vec!["private".to_string()];
        assert!(validate(&config).is_err());

        config.crawl.reject_paths = vec!["/private".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_reject_entry_must_name_extension() {
        let mut config = MirrorConfig::default();
        config.crawl.reject_extensions = vec![".".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rate_limit_must_parse() {
        let mut config = MirrorConfig::default();
        config.crawl.rate_limit = Some("fast".to_string());
        assert!(validate(&config).is_err());

        config.crawl.rate_limit = Some("400k".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = MirrorConfig::default();
        config.http.request_timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = MirrorConfig::default();
        config.http.connect_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }
}
