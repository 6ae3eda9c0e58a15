use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - download_dir is not empty
/// - batch_size is not 0
/// - size window, when both bounds are set, is not inverted
/// - date window, when both bounds are set, is not inverted
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.download.download_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "download.download_dir cannot be empty".to_string(),
        ));
    }

    if config.download.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "download.batch_size cannot be 0".to_string(),
        ));
    }

    if let (Some(min), Some(max)) = (config.filter.min_size_mb, config.filter.max_size_mb) {
        if min > max {
            return Err(ConfigError::ValidationError(format!(
                "filter.min_size_mb ({min}) is greater than filter.max_size_mb ({max})"
            )));
        }
    }

    if let (Some(from), Some(to)) = (config.filter.published_from, config.filter.published_to) {
        if from > to {
            return Err(ConfigError::ValidationError(format!(
                "filter.published_from ({from}) is after filter.published_to ({to})"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_download_dir_fails() {
        let mut config = Config::default();
        config.download.download_dir = "".into();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = Config::default();
        config.download.batch_size = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_inverted_size_window_fails() {
        let mut config = Config::default();
        config.filter.min_size_mb = Some(100.0);
        config.filter.max_size_mb = Some(1.0);
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_inverted_date_window_fails() {
        let mut config = Config::default();
        config.filter.published_from = NaiveDate::from_ymd_opt(2025, 1, 1);
        config.filter.published_to = NaiveDate::from_ymd_opt(2024, 1, 1);
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
