//! Candidate and channel types produced by the message source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved channel, ready for iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntity {
    /// Stable channel id, used as the tracker keyspace.
    pub id: String,
    /// Human-readable title.
    pub title: String,
}

/// One remote message under consideration for download.
///
/// Candidates are transient: consumed and discarded per iteration, never
/// persisted directly. A message without an attachment is a well-formed
/// candidate with `media: None`; it only ever advances the cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Channel the message belongs to.
    pub channel_id: String,
    /// Message id, monotonically increasing and unique within a channel.
    pub message_id: i64,
    /// When the message was published.
    pub published_at: Option<DateTime<Utc>>,
    /// The attachment, when the message carries one.
    pub media: Option<MediaInfo>,
}

impl Candidate {
    /// Display name for logs: the raw title when present, otherwise a
    /// placeholder derived from the message id.
    pub fn display_name(&self) -> String {
        self.media
            .as_ref()
            .and_then(|m| m.filename.clone())
            .unwrap_or_else(|| format!("message {}", self.message_id))
    }
}

/// Attachment metadata carried by a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Raw title/filename as the source reports it; may be absent.
    pub filename: Option<String>,
    /// Attachment size in bytes.
    pub byte_size: u64,
    /// MIME content type.
    pub content_type: String,
    /// Coarse attachment kind derived from the content type.
    pub kind: MediaKind,
    /// Structured audio metadata, when the source provides it.
    pub audio: Option<AudioAttributes>,
}

impl MediaInfo {
    /// Attachment size in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.byte_size as f64 / (1024.0 * 1024.0)
    }
}

/// Coarse attachment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Document,
}

/// Audio attributes attached to a media document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttributes {
    pub performer: Option<String>,
    pub title: Option<String>,
    pub duration_secs: Option<u32>,
}
