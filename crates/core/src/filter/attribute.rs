//! Attribute-based candidate filter.

use std::path::Path;

use tracing::debug;

use super::config::FilterConfig;
use super::MediaFilter;
use crate::source::Candidate;

/// Config-driven filter on attachment kind, extension, size and
/// publish date.
pub struct AttributeFilter {
    config: FilterConfig,
    // Lowercased once so accept() can compare case-insensitively.
    extensions: Vec<String>,
}

impl AttributeFilter {
    pub fn new(config: FilterConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|e| e.to_lowercase())
            .collect();
        Self { config, extensions }
    }

    fn check_extension(&self, filename: Option<&str>) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(filename) = filename else {
            return false;
        };
        let ext = Path::new(filename)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.extensions.contains(&ext)
    }

    fn check_size(&self, byte_size: u64) -> bool {
        if byte_size == 0 {
            return false;
        }
        let size_mb = byte_size as f64 / (1024.0 * 1024.0);
        if let Some(min) = self.config.min_size_mb {
            if size_mb < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size_mb {
            if size_mb > max {
                return false;
            }
        }
        true
    }

    fn check_date(&self, candidate: &Candidate) -> bool {
        // No publish date means the window cannot exclude it.
        let Some(published_at) = candidate.published_at else {
            return true;
        };
        let date = published_at.date_naive();
        if let Some(from) = self.config.published_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.config.published_to {
            if date > to {
                return false;
            }
        }
        true
    }
}

impl MediaFilter for AttributeFilter {
    fn accept(&self, candidate: &Candidate) -> bool {
        let Some(media) = &candidate.media else {
            return false;
        };

        if !self.config.kinds.is_empty() && !self.config.kinds.contains(&media.kind) {
            debug!("Filtered out (kind): {}", candidate.display_name());
            return false;
        }
        if !self.check_extension(media.filename.as_deref()) {
            debug!("Filtered out (format): {}", candidate.display_name());
            return false;
        }
        if !self.check_size(media.byte_size) {
            debug!("Filtered out (size): {}", candidate.display_name());
            return false;
        }
        if !self.check_date(candidate) {
            debug!("Filtered out (date): {}", candidate.display_name());
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MediaInfo, MediaKind};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn candidate(filename: &str, byte_size: u64, kind: MediaKind) -> Candidate {
        Candidate {
            channel_id: "ch".to_string(),
            message_id: 1,
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            media: Some(MediaInfo {
                filename: Some(filename.to_string()),
                byte_size,
                content_type: "audio/flac".to_string(),
                kind,
                audio: None,
            }),
        }
    }

    fn mb(n: u64) -> u64 {
        n * 1024 * 1024
    }

    #[test]
    fn test_unrestricted_filter_accepts_media() {
        let filter = AttributeFilter::new(FilterConfig::default());
        assert!(filter.accept(&candidate("a.flac", mb(5), MediaKind::Audio)));
    }

    #[test]
    fn test_rejects_candidate_without_media() {
        let filter = AttributeFilter::new(FilterConfig::default());
        let c = Candidate {
            channel_id: "ch".to_string(),
            message_id: 1,
            published_at: None,
            media: None,
        };
        assert!(!filter.accept(&c));
    }

    #[test]
    fn test_kind_restriction() {
        let filter = AttributeFilter::new(FilterConfig {
            kinds: vec![MediaKind::Audio],
            ..Default::default()
        });
        assert!(filter.accept(&candidate("a.flac", mb(5), MediaKind::Audio)));
        assert!(!filter.accept(&candidate("a.pdf", mb(5), MediaKind::Document)));
    }

    #[test]
    fn test_extension_restriction_is_case_insensitive() {
        let filter = AttributeFilter::new(FilterConfig {
            extensions: vec![".FLAC".to_string()],
            ..Default::default()
        });
        assert!(filter.accept(&candidate("a.flac", mb(5), MediaKind::Audio)));
        assert!(filter.accept(&candidate("b.FLAC", mb(5), MediaKind::Audio)));
        assert!(!filter.accept(&candidate("c.mp3", mb(5), MediaKind::Audio)));
    }

    #[test]
    fn test_size_window() {
        let filter = AttributeFilter::new(FilterConfig {
            min_size_mb: Some(1.0),
            max_size_mb: Some(100.0),
            ..Default::default()
        });
        assert!(!filter.accept(&candidate("a.flac", 512 * 1024, MediaKind::Audio)));
        assert!(filter.accept(&candidate("a.flac", mb(50), MediaKind::Audio)));
        assert!(!filter.accept(&candidate("a.flac", mb(200), MediaKind::Audio)));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let filter = AttributeFilter::new(FilterConfig::default());
        assert!(!filter.accept(&candidate("a.flac", 0, MediaKind::Audio)));
    }

    #[test]
    fn test_date_window() {
        let filter = AttributeFilter::new(FilterConfig {
            published_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            published_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        });
        assert!(filter.accept(&candidate("a.flac", mb(5), MediaKind::Audio)));

        let mut old = candidate("a.flac", mb(5), MediaKind::Audio);
        old.published_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert!(!filter.accept(&old));

        // Candidates without a publish date pass the window.
        let mut undated = candidate("a.flac", mb(5), MediaKind::Audio);
        undated.published_at = None;
        assert!(filter.accept(&undated));
    }
}
