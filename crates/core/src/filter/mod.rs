//! Candidate filtering seam.
//!
//! The orchestrator consults an external predicate before deciding whether
//! to fetch. [`AttributeFilter`] is the built-in config-driven
//! implementation; any other policy can be plugged in through the
//! [`MediaFilter`] trait.

mod attribute;
mod config;

pub use attribute::AttributeFilter;
pub use config::FilterConfig;

use crate::source::Candidate;

/// Decides whether a candidate is of interest at all.
pub trait MediaFilter: Send + Sync {
    /// True when the candidate should be considered for download.
    fn accept(&self, candidate: &Candidate) -> bool;
}

/// Filter that accepts every candidate carrying media.
pub struct AcceptAll;

impl MediaFilter for AcceptAll {
    fn accept(&self, candidate: &Candidate) -> bool {
        candidate.media.is_some()
    }
}
