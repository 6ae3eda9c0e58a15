//! Content-addressed download tracking and blacklist.
//!
//! The artifact tracker is the skip/retry decision authority. It records
//! every completed download keyed by the content hash of the bytes as
//! stored on disk, keeps a blacklist of permanently-skippable message ids,
//! and reconciles divergence between its records and the filesystem.
//!
//! The hash is computed after the file is fully written, never from the
//! bytes in flight: the key fingerprints exactly what is on disk, so a
//! corrupted partial write cannot poison the dedup index. Two messages
//! whose files are byte-identical collide on purpose; the later commit
//! overwrites the earlier record.

mod hash;
mod types;

pub use hash::{hash_file, HashAlgorithm};
pub use types::{ArtifactRecord, FetchDecision, TrackerError, TrackerStatistics};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::metrics;
use crate::source::Candidate;
use crate::store;

/// Persisted store shape: record map keyed by content hash, blacklist id
/// array, and an update stamp.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ArtifactState {
    downloaded_files: BTreeMap<String, ArtifactRecord>,
    blacklisted_files: BTreeSet<i64>,
    last_updated: Option<DateTime<Utc>>,
}

/// Content-addressed record of completed downloads plus blacklist.
pub struct ArtifactTracker {
    path: PathBuf,
    algorithm: HashAlgorithm,
    state: Mutex<ArtifactState>,
    // Reasons are process-lifetime metadata; the persisted blacklist is a
    // plain id array.
    blacklist_reasons: Mutex<HashMap<i64, String>>,
}

impl ArtifactTracker {
    /// Opens the tracker, loading any existing snapshot from `path`.
    pub fn open(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Self {
        let path = path.as_ref().to_path_buf();
        let state: ArtifactState = store::load_or_default(&path);
        info!(
            "Artifact store loaded: {} downloaded, {} blacklisted",
            state.downloaded_files.len(),
            state.blacklisted_files.len()
        );
        Self {
            path,
            algorithm,
            state: Mutex::new(state),
            blacklist_reasons: Mutex::new(HashMap::new()),
        }
    }

    /// Decides whether a candidate should be fetched.
    ///
    /// Blacklist membership wins over everything else. A record whose
    /// file has gone missing from disk yields `Proceed`: tracker and
    /// filesystem have diverged and a re-fetch reconciles them. The stale
    /// record stays in place until the next successful commit overwrites
    /// it under the new content hash.
    pub fn decide(&self, candidate: &Candidate) -> FetchDecision {
        let state = self.state.lock().unwrap();

        if state.blacklisted_files.contains(&candidate.message_id) {
            let reason = self
                .blacklist_reasons
                .lock()
                .unwrap()
                .get(&candidate.message_id)
                .cloned();
            return FetchDecision::SkipBlacklisted { reason };
        }

        let existing = state
            .downloaded_files
            .values()
            .find(|r| r.channel_id == candidate.channel_id && r.message_id == candidate.message_id);

        match existing {
            Some(record) if record.file_path.exists() => FetchDecision::SkipAlreadyDownloaded {
                existing_path: record.file_path.clone(),
            },
            Some(record) => {
                warn!(
                    "File tracked but missing on disk, allowing re-fetch: {}",
                    record.file_path.display()
                );
                FetchDecision::Proceed
            }
            None => FetchDecision::Proceed,
        }
    }

    /// Records a completed download: hashes the bytes at `final_path`,
    /// inserts/overwrites the record under that hash, persists, and
    /// returns the hash. This is the single point where a download
    /// becomes known.
    pub fn commit(
        &self,
        candidate: &Candidate,
        final_path: &Path,
    ) -> Result<String, TrackerError> {
        let (content_hash, byte_size) =
            hash_file(final_path, self.algorithm).map_err(|e| TrackerError::Hash {
                path: final_path.to_path_buf(),
                source: e,
            })?;

        let filename = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = candidate
            .media
            .as_ref()
            .map(|m| m.content_type.clone())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let record = ArtifactRecord {
            message_id: candidate.message_id,
            channel_id: candidate.channel_id.clone(),
            filename: filename.clone(),
            file_path: final_path.to_path_buf(),
            byte_size,
            size_mb: round_one_decimal(byte_size as f64 / (1024.0 * 1024.0)),
            content_type,
            downloaded_at: Utc::now(),
            published_at: candidate.published_at,
        };

        let mut state = self.state.lock().unwrap();
        state.downloaded_files.insert(content_hash.clone(), record);
        self.flush(&mut state);
        info!("File tracked: {} -> {}", filename, content_hash);

        Ok(content_hash)
    }

    /// Marks a message permanently ineligible for download. Idempotent.
    pub fn blacklist(&self, message_id: i64, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.state.lock().unwrap();
        if state.blacklisted_files.insert(message_id) {
            metrics::BLACKLIST_ADDITIONS.inc();
        }
        self.flush(&mut state);
        self.blacklist_reasons
            .lock()
            .unwrap()
            .insert(message_id, reason.clone());
        info!("Message {} blacklisted: {}", message_id, reason);
    }

    /// Removes a message from the blacklist. Idempotent.
    pub fn unblacklist(&self, message_id: i64) {
        let mut state = self.state.lock().unwrap();
        if state.blacklisted_files.remove(&message_id) {
            self.flush(&mut state);
            info!("Message {} removed from blacklist", message_id);
        }
        self.blacklist_reasons.lock().unwrap().remove(&message_id);
    }

    /// True when the message is blacklisted.
    pub fn is_blacklisted(&self, message_id: i64) -> bool {
        self.state
            .lock()
            .unwrap()
            .blacklisted_files
            .contains(&message_id)
    }

    /// Looks up the record for a `(channel, message)` pair, with its hash.
    pub fn find_by_message(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Option<(String, ArtifactRecord)> {
        let state = self.state.lock().unwrap();
        state
            .downloaded_files
            .iter()
            .find(|(_, r)| r.channel_id == channel_id && r.message_id == message_id)
            .map(|(h, r)| (h.clone(), r.clone()))
    }

    /// Sweeps all records and removes those whose file no longer exists
    /// on disk, persisting once at the end. Offline maintenance, not the
    /// hot path.
    pub fn reconcile(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let stale: Vec<String> = state
            .downloaded_files
            .iter()
            .filter(|(_, r)| !r.file_path.exists())
            .map(|(h, _)| h.clone())
            .collect();

        for hash in &stale {
            if let Some(record) = state.downloaded_files.remove(hash) {
                info!(
                    "Removing missing file from tracker: {}",
                    record.file_path.display()
                );
            }
        }

        if !stale.is_empty() {
            self.flush(&mut state);
            metrics::RECONCILE_REMOVALS.inc_by(stale.len() as u64);
            info!("Reconciled {} missing files out of tracker", stale.len());
        }
        stale.len()
    }

    /// Tracker counters for the stats front end.
    pub fn statistics(&self) -> TrackerStatistics {
        let state = self.state.lock().unwrap();
        let store_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        TrackerStatistics {
            downloaded_files: state.downloaded_files.len(),
            blacklisted_files: state.blacklisted_files.len(),
            store_path: self.path.clone(),
            store_exists: self.path.exists(),
            store_size_bytes,
        }
    }

    /// Path of the backing store file.
    pub fn store_path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, state: &mut ArtifactState) {
        state.last_updated = Some(Utc::now());
        if let Err(e) = store::persist(&self.path, &*state) {
            metrics::PERSIST_FAILURES
                .with_label_values(&["artifact"])
                .inc();
            error!("Failed to persist artifact store: {}", e);
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
