//! Error type for the external message source.

use thiserror::Error;

/// Errors surfaced by a [`MessageSource`](super::MessageSource)
/// implementation.
///
/// Flood control and timeouts get dedicated variants because the
/// orchestrator classifies them as transient infrastructure failures and
/// blacklists the offending item to stop retry storms. `Other` is the
/// escape hatch for opaque backend errors; only there does classification
/// fall back to sniffing the error text.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend applied flood control / rate limiting.
    #[error("flood control from source{}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    FloodWait { retry_after_secs: Option<u64> },

    /// The request timed out.
    #[error("source request timed out: {0}")]
    Timeout(String),

    /// The channel reference could not be resolved.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The attachment exists but cannot be fetched.
    #[error("attachment unavailable: {0}")]
    Unavailable(String),

    /// Local I/O failure while writing fetched bytes.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else the backend reports.
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// True for transient infrastructure failures that should blacklist
    /// the item rather than be retried within the run.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::FloodWait { .. } | SourceError::Timeout(_) => true,
            SourceError::Other(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("flood") || msg.contains("timeout")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_variants_are_transient() {
        assert!(SourceError::FloodWait {
            retry_after_secs: Some(30)
        }
        .is_transient());
        assert!(SourceError::Timeout("read".to_string()).is_transient());
    }

    #[test]
    fn test_other_is_sniffed_for_transient_signatures() {
        assert!(SourceError::Other("FLOOD_WAIT_42".to_string()).is_transient());
        assert!(SourceError::Other("connection timeout".to_string()).is_transient());
        assert!(!SourceError::Other("permission denied".to_string()).is_transient());
    }

    #[test]
    fn test_non_transient_variants() {
        assert!(!SourceError::ChannelNotFound("ch".to_string()).is_transient());
        assert!(!SourceError::Unavailable("gone".to_string()).is_transient());
    }

    #[test]
    fn test_flood_wait_display() {
        let err = SourceError::FloodWait {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "flood control from source, retry after 30s");
        let err = SourceError::FloodWait {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "flood control from source");
    }
}
