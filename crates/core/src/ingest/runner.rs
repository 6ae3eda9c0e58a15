//! The ingest run loop.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::IngestConfig;
use super::filename::derive_filename;
use super::types::{CandidateOutcome, ChannelReport, IngestError, SessionReport, SkipReason};
use crate::artifact::{ArtifactTracker, FetchDecision};
use crate::cursor::CursorTracker;
use crate::filter::MediaFilter;
use crate::metrics;
use crate::source::{Candidate, ChannelEntity, MessageSource};

/// Drives batched retrieval, filtering, dedup decisions, fetching and
/// commit for a set of channels.
///
/// Channels are processed sequentially, messages within a channel in
/// ascending id order. Every candidate that reaches a terminal outcome
/// advances the cursor, including failed fetches; only a failed batch
/// retrieval leaves the watermark untouched so the batch is retried on
/// the next run.
pub struct IngestRunner {
    config: IngestConfig,
    source: Arc<dyn MessageSource>,
    filter: Arc<dyn MediaFilter>,
    cursor: Arc<CursorTracker>,
    artifacts: Arc<ArtifactTracker>,
}

impl IngestRunner {
    pub fn new(
        config: IngestConfig,
        source: Arc<dyn MessageSource>,
        filter: Arc<dyn MediaFilter>,
        cursor: Arc<CursorTracker>,
        artifacts: Arc<ArtifactTracker>,
    ) -> Self {
        Self {
            config,
            source,
            filter,
            cursor,
            artifacts,
        }
    }

    /// Runs one ingestion pass over `channels`. An empty slice means
    /// "every channel the source knows about".
    pub async fn run(&self, channels: &[String]) -> Result<SessionReport, IngestError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        std::fs::create_dir_all(&self.config.download_dir).map_err(|e| {
            IngestError::DownloadDir {
                path: self.config.download_dir.clone(),
                source: e,
            }
        })?;

        let channels = if channels.is_empty() {
            self.source.list_channels().await?
        } else {
            channels.to_vec()
        };
        info!(
            "Ingest run {} started: {} channels, source '{}'",
            run_id,
            channels.len(),
            self.source.name()
        );

        let mut reports = Vec::with_capacity(channels.len());
        let mut run_downloaded = 0usize;

        for channel_ref in &channels {
            if self.run_ceiling_reached(run_downloaded) {
                info!(
                    "Run download ceiling ({}) reached, stopping",
                    self.config.max_files_per_run
                );
                break;
            }

            let entity = match self.source.resolve(channel_ref).await {
                Ok(entity) => entity,
                Err(e) => {
                    // One unresolvable channel must not sink the run.
                    error!("Failed to resolve channel '{}': {}", channel_ref, e);
                    continue;
                }
            };

            let report = self.process_channel(&entity, run_downloaded).await;
            run_downloaded += report.downloaded;
            reports.push(report);
        }

        let report = SessionReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            channels: reports,
        };
        info!(
            "Ingest run {} finished: {} downloaded, {} skipped, {} failed across {} messages",
            run_id,
            report.total_downloaded(),
            report.total_skipped(),
            report.total_failed(),
            report.total_messages()
        );
        Ok(report)
    }

    async fn process_channel(&self, entity: &ChannelEntity, run_downloaded: usize) -> ChannelReport {
        let mut report = ChannelReport::new(&entity.id, &entity.title);
        let mut after_id = self.cursor.last_processed(&entity.id);
        info!(
            "Processing channel '{}' from message id {:?}",
            entity.title, after_id
        );

        'batches: loop {
            let batch = match self
                .source
                .next_batch(entity, after_id, self.config.batch_size)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    // The watermark stays put so this batch is retried
                    // next run.
                    error!(
                        "Batch retrieval failed for '{}' after id {:?}: {}",
                        entity.title, after_id, e
                    );
                    metrics::FETCH_FAILURES.with_label_values(&["batch"]).inc();
                    break;
                }
            };
            if batch.is_empty() {
                debug!("Channel '{}' exhausted", entity.title);
                break;
            }

            for candidate in batch {
                if self.run_ceiling_reached(run_downloaded + report.downloaded)
                    || self.channel_ceiling_reached(report.downloaded)
                {
                    info!("Download ceiling reached in '{}'", entity.title);
                    break 'batches;
                }

                let outcome = self.process_candidate(&candidate).await;
                report.record(&outcome);
                // Terminal outcomes of every kind advance the cursor.
                self.cursor.mark_processed(&entity.id, candidate.message_id);
                after_id = Some(candidate.message_id);
            }
        }

        info!(
            "Channel '{}' done: {} downloaded, {} skipped, {} failed",
            entity.title, report.downloaded, report.skipped, report.failed
        );
        report
    }

    async fn process_candidate(&self, candidate: &Candidate) -> CandidateOutcome {
        if !self.filter.accept(candidate) {
            metrics::CANDIDATES_SKIPPED
                .with_label_values(&["filtered"])
                .inc();
            return CandidateOutcome::Filtered;
        }
        metrics::CANDIDATES_FOUND.inc();

        match self.artifacts.decide(candidate) {
            FetchDecision::SkipBlacklisted { reason } => {
                debug!(
                    "Skipping blacklisted message {}: {}",
                    candidate.message_id,
                    reason.as_deref().unwrap_or("no reason recorded")
                );
                metrics::CANDIDATES_SKIPPED
                    .with_label_values(&["blacklisted"])
                    .inc();
                CandidateOutcome::Skipped(SkipReason::Blacklisted(reason))
            }
            FetchDecision::SkipAlreadyDownloaded { existing_path } => {
                debug!(
                    "Already downloaded: {} -> {}",
                    candidate.display_name(),
                    existing_path.display()
                );
                metrics::CANDIDATES_SKIPPED
                    .with_label_values(&["already_downloaded"])
                    .inc();
                CandidateOutcome::Skipped(SkipReason::AlreadyDownloaded(existing_path))
            }
            FetchDecision::Proceed => self.fetch_candidate(candidate).await,
        }
    }

    async fn fetch_candidate(&self, candidate: &Candidate) -> CandidateOutcome {
        let filename = derive_filename(candidate);
        let dest = self.config.download_dir.join(&filename);

        // A file already sitting at the destination is never overwritten,
        // whatever the tracker believes about this message. Stale records
        // must not grant permission to clobber bytes this engine did not
        // write.
        if dest.exists() {
            warn!("Name collision, not overwriting: {}", dest.display());
            metrics::CANDIDATES_SKIPPED
                .with_label_values(&["name_collision"])
                .inc();
            return CandidateOutcome::Skipped(SkipReason::NameCollision(dest));
        }

        info!("Downloading {}", describe(candidate, &filename));
        match self.source.fetch(candidate, &dest).await {
            Ok(0) => {
                warn!("Fetched zero bytes for {}, discarding", filename);
                remove_partial(&dest);
                metrics::FETCH_FAILURES.with_label_values(&["empty"]).inc();
                CandidateOutcome::Failed {
                    reason: "zero-byte download".to_string(),
                    blacklisted: false,
                }
            }
            Ok(bytes) => match self.artifacts.commit(candidate, &dest) {
                Ok(content_hash) => {
                    metrics::DOWNLOADS_COMMITTED.inc();
                    info!("Downloaded {} ({} bytes)", filename, bytes);
                    CandidateOutcome::Downloaded {
                        path: dest,
                        content_hash,
                    }
                }
                Err(e) => {
                    // Bytes without a record are invisible to the dedup
                    // index and would block the name forever; drop them.
                    remove_partial(&dest);
                    error!("Failed to commit {}: {}", filename, e);
                    metrics::FETCH_FAILURES.with_label_values(&["commit"]).inc();
                    CandidateOutcome::Failed {
                        reason: e.to_string(),
                        blacklisted: false,
                    }
                }
            },
            Err(e) => {
                remove_partial(&dest);
                let blacklisted = e.is_transient();
                if blacklisted {
                    // Transient throttling errors poison the message for
                    // this deployment; the operator can unblacklist later.
                    self.artifacts
                        .blacklist(candidate.message_id, e.to_string());
                    metrics::FETCH_FAILURES
                        .with_label_values(&["transient"])
                        .inc();
                } else {
                    metrics::FETCH_FAILURES.with_label_values(&["error"]).inc();
                }
                error!("Failed to fetch {}: {}", filename, e);
                CandidateOutcome::Failed {
                    reason: e.to_string(),
                    blacklisted,
                }
            }
        }
    }

    fn run_ceiling_reached(&self, downloaded: usize) -> bool {
        self.config.max_files_per_run > 0 && downloaded >= self.config.max_files_per_run
    }

    fn channel_ceiling_reached(&self, downloaded: usize) -> bool {
        self.config.max_files_per_channel > 0 && downloaded >= self.config.max_files_per_channel
    }
}

fn remove_partial(path: &PathBuf) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove partial file {}: {}", path.display(), e);
        }
    }
}

/// One-line description of a candidate for the download log, with
/// duration and size when known.
fn describe(candidate: &Candidate, filename: &str) -> String {
    let Some(media) = &candidate.media else {
        return filename.to_string();
    };
    let mut parts = vec![filename.to_string()];
    if let Some(audio) = &media.audio {
        if let Some(secs) = audio.duration_secs {
            parts.push(format!("[{}]", format_duration(secs)));
        }
    }
    parts.push(format!("[{:.1} MB]", media.size_mb()));
    parts.join(" ")
}

fn format_duration(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AudioAttributes, MediaInfo, MediaKind};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(3600), "60:00");
    }

    #[test]
    fn test_describe_includes_duration_and_size() {
        let candidate = Candidate {
            channel_id: "ch".to_string(),
            message_id: 1,
            published_at: None,
            media: Some(MediaInfo {
                filename: Some("t.flac".to_string()),
                byte_size: 5 * 1024 * 1024,
                content_type: "audio/flac".to_string(),
                kind: MediaKind::Audio,
                audio: Some(AudioAttributes {
                    performer: None,
                    title: None,
                    duration_secs: Some(185),
                }),
            }),
        };
        assert_eq!(describe(&candidate, "t.flac"), "t.flac [03:05] [5.0 MB]");
    }
}
