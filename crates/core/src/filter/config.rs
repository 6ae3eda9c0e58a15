//! Attribute filter configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::source::MediaKind;

/// Configuration for [`AttributeFilter`](super::AttributeFilter).
///
/// Empty lists mean "no restriction" for that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Allowed attachment kinds.
    #[serde(default)]
    pub kinds: Vec<MediaKind>,

    /// Allowed filename extensions, dot included (e.g. ".flac").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Minimum attachment size in megabytes.
    #[serde(default)]
    pub min_size_mb: Option<f64>,

    /// Maximum attachment size in megabytes.
    #[serde(default)]
    pub max_size_mb: Option<f64>,

    /// Only accept messages published on or after this date.
    #[serde(default)]
    pub published_from: Option<NaiveDate>,

    /// Only accept messages published on or before this date.
    #[serde(default)]
    pub published_to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unrestricted() {
        let config = FilterConfig::default();
        assert!(config.kinds.is_empty());
        assert!(config.extensions.is_empty());
        assert!(config.min_size_mb.is_none());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            kinds = ["audio"]
            extensions = [".flac", ".mp3"]
            min_size_mb = 1.0
            max_size_mb = 200.0
            published_from = "2023-01-01"
        "#;
        let config: FilterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.kinds, vec![MediaKind::Audio]);
        assert_eq!(config.extensions.len(), 2);
        assert_eq!(
            config.published_from,
            Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
        assert!(config.published_to.is_none());
    }
}
