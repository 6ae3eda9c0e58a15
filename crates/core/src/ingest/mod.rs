//! Ingestion orchestration.
//!
//! Ties the source, filter, cursor and artifact tracker together into a
//! resumable run: batched retrieval per channel, a decision per
//! candidate, filename derivation, fetch, verification and commit.

mod config;
mod filename;
mod runner;
mod types;

pub use config::IngestConfig;
pub use filename::{derive_filename, sanitize, MAX_FILENAME_BYTES};
pub use runner::IngestRunner;
pub use types::{
    CandidateOutcome, ChannelReport, IngestError, SessionReport, SkipReason,
};
