pub mod artifact;
pub mod config;
pub mod cursor;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod normalizer;
pub mod source;
pub mod store;
pub mod testing;

pub use artifact::{
    hash_file, ArtifactRecord, ArtifactTracker, FetchDecision, HashAlgorithm, TrackerError,
    TrackerStatistics,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, StoreConfig,
};
pub use cursor::CursorTracker;
pub use filter::{AcceptAll, AttributeFilter, FilterConfig, MediaFilter};
pub use ingest::{
    CandidateOutcome, ChannelReport, IngestConfig, IngestError, IngestRunner, SessionReport,
    SkipReason,
};
pub use normalizer::normalize;
pub use source::{
    AudioAttributes, Candidate, ChannelEntity, MediaInfo, MediaKind, MessageSource, SourceError,
};
