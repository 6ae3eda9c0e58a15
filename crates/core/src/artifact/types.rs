//! Types for the artifact tracker.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during artifact tracking.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Failed to read the stored file while computing its content hash.
    #[error("failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persisted record of one completed download, keyed by content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Message the file came from.
    pub message_id: i64,
    /// Channel the message belongs to.
    pub channel_id: String,
    /// Final filename on disk.
    pub filename: String,
    /// Full path of the stored file.
    pub file_path: PathBuf,
    /// Size of the stored file in bytes.
    pub byte_size: u64,
    /// Size in megabytes, rounded to one decimal.
    pub size_mb: f64,
    /// MIME content type reported by the source.
    pub content_type: String,
    /// When the download completed.
    pub downloaded_at: DateTime<Utc>,
    /// When the message was published, if known.
    pub published_at: Option<DateTime<Utc>>,
}

/// Three-way skip/proceed decision for a candidate.
///
/// Returned by value, never thrown: the orchestrator branches on it
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchDecision {
    /// Not blacklisted, no live record on disk: fetch it.
    Proceed,
    /// The message is permanently blacklisted.
    SkipBlacklisted { reason: Option<String> },
    /// A record exists and its file is still present on disk.
    SkipAlreadyDownloaded { existing_path: PathBuf },
}

/// Snapshot of tracker counters, for the stats front end.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStatistics {
    pub downloaded_files: usize,
    pub blacklisted_files: usize,
    pub store_path: PathBuf,
    pub store_exists: bool,
    pub store_size_bytes: u64,
}
