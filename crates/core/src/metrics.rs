//! Prometheus metrics for the ingestion engine.
//!
//! Counters cover the fetch hot path (found/downloaded/skipped/failed),
//! blacklist activity and store persistence failures. They are process-wide
//! statics; call [`register_metrics`] once at startup to expose them on a
//! registry.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Candidates that passed the filter and entered the decision step.
pub static CANDIDATES_FOUND: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "magpie_candidates_found_total",
        "Candidates accepted by the filter",
    )
    .unwrap()
});

/// Completed downloads committed to the artifact tracker.
pub static DOWNLOADS_COMMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("magpie_downloads_committed_total", "Downloads committed").unwrap()
});

/// Skipped candidates by reason.
pub static CANDIDATES_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magpie_candidates_skipped_total", "Skipped candidates"),
        &["reason"], // "blacklisted", "already_downloaded", "name_collision", "filtered"
    )
    .unwrap()
});

/// Fetches that failed.
pub static FETCH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magpie_fetch_failures_total", "Failed fetches"),
        &["kind"], // "transient", "other"
    )
    .unwrap()
});

/// Messages blacklisted by the transient-failure hook.
pub static BLACKLIST_ADDITIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("magpie_blacklist_additions_total", "Messages blacklisted").unwrap()
});

/// Store flushes that failed (state kept in memory).
pub static PERSIST_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magpie_persist_failures_total", "Failed store flushes"),
        &["store"], // "cursor", "artifact"
    )
    .unwrap()
});

/// Stale records removed by offline reconciliation.
pub static RECONCILE_REMOVALS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "magpie_reconcile_removals_total",
        "Artifact records removed by reconcile",
    )
    .unwrap()
});

/// Registers all engine metrics on the given registry.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(CANDIDATES_FOUND.clone()))?;
    registry.register(Box::new(DOWNLOADS_COMMITTED.clone()))?;
    registry.register(Box::new(CANDIDATES_SKIPPED.clone()))?;
    registry.register(Box::new(FETCH_FAILURES.clone()))?;
    registry.register(Box::new(BLACKLIST_ADDITIONS.clone()))?;
    registry.register(Box::new(PERSIST_FAILURES.clone()))?;
    registry.register(Box::new(RECONCILE_REMOVALS.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_on_fresh_registry() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
    }

    #[test]
    fn test_counters_increment() {
        let before = DOWNLOADS_COMMITTED.get();
        DOWNLOADS_COMMITTED.inc();
        assert_eq!(DOWNLOADS_COMMITTED.get(), before + 1);
    }
}
