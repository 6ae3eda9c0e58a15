//! Mock message source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{Candidate, ChannelEntity, MessageSource, SourceError};

/// Mock implementation of the MessageSource trait.
///
/// Provides controllable behavior for testing:
/// - Scripted channels and candidates served in ascending id order
/// - Per-message payload bytes written on fetch
/// - One-shot injectable fetch and batch errors
/// - Fetch call counting for assertions
pub struct MockSource {
    channels: Arc<RwLock<Vec<ChannelEntity>>>,
    /// Candidates per channel id, kept sorted by message id.
    candidates: Arc<RwLock<HashMap<String, Vec<Candidate>>>>,
    /// Bytes served for `(channel_id, message_id)` on fetch.
    payloads: Arc<RwLock<HashMap<(String, i64), Vec<u8>>>>,
    /// One-shot fetch errors by message id.
    fetch_errors: Arc<RwLock<HashMap<i64, SourceError>>>,
    /// One-shot batch retrieval errors by channel id.
    batch_errors: Arc<RwLock<HashMap<String, SourceError>>>,
    fetch_calls: Arc<RwLock<usize>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(Vec::new())),
            candidates: Arc::new(RwLock::new(HashMap::new())),
            payloads: Arc::new(RwLock::new(HashMap::new())),
            fetch_errors: Arc::new(RwLock::new(HashMap::new())),
            batch_errors: Arc::new(RwLock::new(HashMap::new())),
            fetch_calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Register a channel the source will resolve and list.
    pub async fn add_channel(&self, id: &str, title: &str) {
        self.channels.write().await.push(ChannelEntity {
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    /// Script a candidate and the bytes a fetch of it should produce.
    pub async fn add_candidate(&self, candidate: Candidate, payload: &[u8]) {
        let key = (candidate.channel_id.clone(), candidate.message_id);
        self.payloads.write().await.insert(key, payload.to_vec());

        let mut candidates = self.candidates.write().await;
        let list = candidates.entry(candidate.channel_id.clone()).or_default();
        list.push(candidate);
        list.sort_by_key(|c| c.message_id);
    }

    /// Make the next fetch of `message_id` fail with `error`.
    pub async fn fail_next_fetch(&self, message_id: i64, error: SourceError) {
        self.fetch_errors.write().await.insert(message_id, error);
    }

    /// Make the next batch retrieval for `channel_id` fail with `error`.
    pub async fn fail_next_batch(&self, channel_id: &str, error: SourceError) {
        self.batch_errors
            .write()
            .await
            .insert(channel_id.to_string(), error);
    }

    /// Number of fetch calls made so far.
    pub async fn fetch_calls(&self) -> usize {
        *self.fetch_calls.read().await
    }
}

#[async_trait]
impl MessageSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_channels(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .channels
            .read()
            .await
            .iter()
            .map(|c| c.id.clone())
            .collect())
    }

    async fn resolve(&self, channel_ref: &str) -> Result<ChannelEntity, SourceError> {
        self.channels
            .read()
            .await
            .iter()
            .find(|c| c.id == channel_ref)
            .cloned()
            .ok_or_else(|| SourceError::ChannelNotFound(channel_ref.to_string()))
    }

    async fn next_batch(
        &self,
        channel: &ChannelEntity,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, SourceError> {
        if let Some(error) = self.batch_errors.write().await.remove(&channel.id) {
            return Err(error);
        }

        let candidates = self.candidates.read().await;
        let batch = candidates
            .get(&channel.id)
            .map(|list| {
                list.iter()
                    .filter(|c| after_id.is_none_or(|after| c.message_id > after))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(batch)
    }

    async fn fetch(&self, candidate: &Candidate, dest: &Path) -> Result<u64, SourceError> {
        *self.fetch_calls.write().await += 1;

        if let Some(error) = self.fetch_errors.write().await.remove(&candidate.message_id) {
            return Err(error);
        }

        let payloads = self.payloads.read().await;
        let key = (candidate.channel_id.clone(), candidate.message_id);
        let bytes = payloads
            .get(&key)
            .ok_or_else(|| SourceError::Unavailable(format!("no payload scripted for {key:?}")))?;
        std::fs::write(dest, bytes)?;
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_batches_respect_watermark_and_limit() {
        let source = MockSource::new();
        source.add_channel("ch", "Channel").await;
        for id in 1..=5 {
            source
                .add_candidate(fixtures::audio_candidate("ch", id, "t.flac"), b"x")
                .await;
        }

        let entity = source.resolve("ch").await.unwrap();
        let batch = source.next_batch(&entity, Some(2), 2).await.unwrap();
        let ids: Vec<i64> = batch.iter().map(|c| c.message_id).collect();
        assert_eq!(ids, vec![3, 4]);

        let rest = source.next_batch(&entity, Some(4), 10).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert!(source.next_batch(&entity, Some(5), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_errors_are_one_shot() {
        let source = MockSource::new();
        source.add_channel("ch", "Channel").await;
        source
            .add_candidate(fixtures::audio_candidate("ch", 1, "t.flac"), b"x")
            .await;
        source
            .fail_next_batch("ch", SourceError::Timeout("slow".to_string()))
            .await;

        let entity = source.resolve("ch").await.unwrap();
        assert!(source.next_batch(&entity, None, 10).await.is_err());
        assert_eq!(source.next_batch(&entity, None, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_writes_payload() {
        let temp = tempfile::TempDir::new().unwrap();
        let source = MockSource::new();
        source.add_channel("ch", "Channel").await;
        let candidate = fixtures::audio_candidate("ch", 1, "t.flac");
        source.add_candidate(candidate.clone(), b"flac bytes").await;

        let dest = temp.path().join("t.flac");
        let bytes = source.fetch(&candidate, &dest).await.unwrap();
        assert_eq!(bytes, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"flac bytes");
        assert_eq!(source.fetch_calls().await, 1);
    }
}
