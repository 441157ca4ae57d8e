use crate::config::Config;
use crate::error::ResolverError;

/// Validates configuration objects for consistency and correctness
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the statistics API base URL
    pub fn validate_base_url(url: &str) -> Result<(), ResolverError> {
        if url.trim().is_empty() {
            return Err(ResolverError::Validation(
                "API base URL cannot be empty".to_string(),
            ));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ResolverError::Validation(
                "API base URL must start with 'http://' or 'https://'".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_cache_ttl(ttl_ms: u64) -> Result<(), ResolverError> {
        if ttl_ms == 0 {
            return Err(ResolverError::Validation(
                "Cache TTL must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates a full configuration
    pub fn validate_config(config: &Config) -> Result<(), ResolverError> {
        Self::validate_base_url(&config.api_base_url)?;
        Self::validate_cache_ttl(config.cache_ttl_ms)?;
        config
            .retry_policy()
            .validate()
            .map_err(ResolverError::Validation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_base_url() {
        assert!(ConfigValidator::validate_base_url("https://api.example.net/v1").is_ok());
        assert!(ConfigValidator::validate_base_url("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ConfigValidator::validate_base_url("").is_err());
        assert!(ConfigValidator::validate_base_url("ftp://example.net").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = Config { max_attempts: 0, ..Config::default() };
        assert!(ConfigValidator::validate_config(&config).is_err());

        let config = Config { timeout_ms: 0, ..Config::default() };
        assert!(ConfigValidator::validate_config(&config).is_err());

        let config = Config { cache_ttl_ms: 0, ..Config::default() };
        assert!(ConfigValidator::validate_config(&config).is_err());
    }
}
