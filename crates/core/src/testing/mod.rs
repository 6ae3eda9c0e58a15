//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock implementation of the message source
//! trait, allowing full ingest runs without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use magpie_core::testing::{fixtures, MockSource};
//!
//! let source = MockSource::new();
//! source.add_channel("deep_house", "Deep House").await;
//! source
//!     .add_candidate(fixtures::audio_candidate("deep_house", 1, "Track.flac"), b"bytes")
//!     .await;
//!
//! // Use as Arc<dyn MessageSource> in an IngestRunner...
//! ```

mod mock_source;

pub use mock_source::MockSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::source::{AudioAttributes, Candidate, MediaInfo, MediaKind};

    /// Create a test audio candidate with reasonable defaults.
    pub fn audio_candidate(channel_id: &str, message_id: i64, filename: &str) -> Candidate {
        Candidate {
            channel_id: channel_id.to_string(),
            message_id,
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            media: Some(MediaInfo {
                filename: Some(filename.to_string()),
                byte_size: 1024 * 1024 * 5, // 5 MB
                content_type: "audio/flac".to_string(),
                kind: MediaKind::Audio,
                audio: Some(AudioAttributes {
                    performer: Some("Test Artist".to_string()),
                    title: Some("Test Track".to_string()),
                    duration_secs: Some(240),
                }),
            }),
        }
    }

    /// Create a test document candidate.
    pub fn document_candidate(channel_id: &str, message_id: i64, filename: &str) -> Candidate {
        let mut candidate = audio_candidate(channel_id, message_id, filename);
        if let Some(media) = candidate.media.as_mut() {
            media.kind = MediaKind::Document;
            media.content_type = "application/octet-stream".to_string();
            media.audio = None;
        }
        candidate
    }

    /// Create a test candidate without any attachment.
    pub fn text_candidate(channel_id: &str, message_id: i64) -> Candidate {
        Candidate {
            channel_id: channel_id.to_string(),
            message_id,
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            media: None,
        }
    }
}
