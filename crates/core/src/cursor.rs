//! Per-channel ingestion cursor.
//!
//! The cursor tracker remembers which message ids of each channel have
//! already been processed and exposes the resume watermark for the next
//! run. Membership is monotonic: ids are only ever added, never removed,
//! and the watermark is always the maximum of the processed set.
//!
//! Every mutation is written through to disk synchronously. A failed
//! flush is logged and counted but does not abort the run; the in-memory
//! state keeps the mutation so a later successful flush includes it. A
//! crash before that flush means the message is reprocessed on restart,
//! which is the accepted trade-off on this boundary.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, error, info};

use crate::metrics;
use crate::store;

/// Persisted shape: channel id to the ordered array of processed ids.
type CursorState = BTreeMap<String, BTreeSet<i64>>;

/// Resumable per-channel "last processed message" ledger.
pub struct CursorTracker {
    path: PathBuf,
    state: Mutex<CursorState>,
}

impl CursorTracker {
    /// Opens the tracker, loading any existing snapshot from `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state: CursorState = store::load_or_default(&path);
        let total: usize = state.values().map(|ids| ids.len()).sum();
        info!(
            "Cursor store loaded: {} channels, {} processed ids",
            state.len(),
            total
        );
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Returns the resume watermark for a channel, or `None` when the
    /// channel has never been processed (start from the beginning).
    pub fn last_processed(&self, channel_id: &str) -> Option<i64> {
        let state = self.state.lock().unwrap();
        state.get(channel_id).and_then(|ids| ids.last().copied())
    }

    /// True when the given message id is already in the processed set.
    pub fn is_processed(&self, channel_id: &str, message_id: i64) -> bool {
        let state = self.state.lock().unwrap();
        state
            .get(channel_id)
            .is_some_and(|ids| ids.contains(&message_id))
    }

    /// Adds `message_id` to the channel's processed set and flushes the
    /// whole store before returning.
    pub fn mark_processed(&self, channel_id: &str, message_id: i64) {
        let mut state = self.state.lock().unwrap();
        state
            .entry(channel_id.to_string())
            .or_default()
            .insert(message_id);

        if let Err(e) = store::persist(&self.path, &*state) {
            metrics::PERSIST_FAILURES.with_label_values(&["cursor"]).inc();
            error!("Failed to persist cursor store: {}", e);
        } else {
            debug!("Message {} marked processed in {}", message_id, channel_id);
        }
    }

    /// Total number of processed ids across all channels.
    pub fn processed_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.values().map(|ids| ids.len()).sum()
    }

    /// Path of the backing store file.
    pub fn store_path(&self) -> &Path {
        &self.path
    }
}
