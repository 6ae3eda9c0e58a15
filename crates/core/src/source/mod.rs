//! Seam to the external message source.
//!
//! The remote protocol client (connection, authentication, message
//! retrieval) lives outside this crate. The engine consumes it through
//! [`MessageSource`]: list the configured channels, resolve each one,
//! iterate its messages in ascending id order, and fetch attachment bytes
//! to a caller-supplied path. Fetching always takes the `Candidate` handle
//! produced by iteration; there is deliberately no way to re-issue a fetch
//! from persisted identifiers.

mod error;
mod types;

pub use error::SourceError;
pub use types::{AudioAttributes, Candidate, ChannelEntity, MediaInfo, MediaKind};

use std::path::Path;

use async_trait::async_trait;

/// An external source of channel messages and attachment bytes.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Name of this source implementation, for logs.
    fn name(&self) -> &str;

    /// Returns the configured channel references.
    async fn list_channels(&self) -> Result<Vec<String>, SourceError>;

    /// Resolves a channel reference into an entity with a stable id.
    async fn resolve(&self, channel_ref: &str) -> Result<ChannelEntity, SourceError>;

    /// Returns up to `limit` candidates of `channel` with message ids
    /// strictly greater than `after_id`, in ascending id order (oldest
    /// first). An empty batch means the channel is exhausted.
    ///
    /// The message id is the only iteration start point. Date-bounded
    /// ingestion is expressed through the publish-date window of the
    /// attribute filter, which sees every candidate the iterator yields.
    async fn next_batch(
        &self,
        channel: &ChannelEntity,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, SourceError>;

    /// Fetches the candidate's attachment bytes to `dest`, returning the
    /// number of bytes written.
    async fn fetch(&self, candidate: &Candidate, dest: &Path) -> Result<u64, SourceError>;
}
