//! Ingest run outcomes and reports.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::artifact::TrackerError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("failed to create download directory {path}: {source}")]
    DownloadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What happened to a single candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    Downloaded {
        path: PathBuf,
        content_hash: String,
    },
    Skipped(SkipReason),
    Failed {
        reason: String,
        blacklisted: bool,
    },
    Filtered,
}

#[derive(Debug)]
pub enum SkipReason {
    Blacklisted(Option<String>),
    AlreadyDownloaded(PathBuf),
    NameCollision(PathBuf),
}

/// Per-channel tally for a run.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub channel_id: String,
    pub channel_title: String,
    pub messages_processed: usize,
    pub files_found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub downloaded_paths: Vec<PathBuf>,
}

impl ChannelReport {
    pub(crate) fn new(channel_id: impl Into<String>, channel_title: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_title: channel_title.into(),
            messages_processed: 0,
            files_found: 0,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            downloaded_paths: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: &CandidateOutcome) {
        self.messages_processed += 1;
        match outcome {
            CandidateOutcome::Downloaded { path, .. } => {
                self.files_found += 1;
                self.downloaded += 1;
                self.downloaded_paths.push(path.clone());
            }
            CandidateOutcome::Skipped(_) => {
                self.files_found += 1;
                self.skipped += 1;
            }
            CandidateOutcome::Failed { .. } => {
                self.files_found += 1;
                self.failed += 1;
            }
            CandidateOutcome::Filtered => {}
        }
    }
}

/// Whole-run summary returned by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub channels: Vec<ChannelReport>,
}

impl SessionReport {
    pub fn total_downloaded(&self) -> usize {
        self.channels.iter().map(|c| c.downloaded).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.channels.iter().map(|c| c.skipped).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.channels.iter().map(|c| c.failed).sum()
    }

    pub fn total_messages(&self) -> usize {
        self.channels.iter().map(|c| c.messages_processed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_report_tallies_outcomes() {
        let mut report = ChannelReport::new("ch", "Channel");
        report.record(&CandidateOutcome::Downloaded {
            path: PathBuf::from("/music/a.flac"),
            content_hash: "abc".to_string(),
        });
        report.record(&CandidateOutcome::Skipped(SkipReason::AlreadyDownloaded(
            PathBuf::from("/music/a.flac"),
        )));
        report.record(&CandidateOutcome::Failed {
            reason: "timeout".to_string(),
            blacklisted: true,
        });
        report.record(&CandidateOutcome::Filtered);

        assert_eq!(report.messages_processed, 4);
        assert_eq!(report.files_found, 3);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.downloaded_paths.len(), 1);
    }

    #[test]
    fn test_session_report_totals() {
        let mut a = ChannelReport::new("a", "A");
        a.downloaded = 2;
        a.skipped = 1;
        let mut b = ChannelReport::new("b", "B");
        b.downloaded = 3;
        b.failed = 1;

        let report = SessionReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            channels: vec![a, b],
        };
        assert_eq!(report.total_downloaded(), 5);
        assert_eq!(report.total_skipped(), 1);
        assert_eq!(report.total_failed(), 1);
    }
}
