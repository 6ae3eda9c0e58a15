//! Ingestion configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::artifact::HashAlgorithm;

/// Configuration for the ingest runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory downloads are written to.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Download ceiling for a whole run (0 = unlimited). Checked only at
    /// decision boundaries, never mid-fetch.
    #[serde(default)]
    pub max_files_per_run: usize,

    /// Download ceiling per channel (0 = unlimited).
    #[serde(default)]
    pub max_files_per_channel: usize,

    /// How many candidates to request from the source per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Content-hash algorithm for the dedup key.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_batch_size() -> usize {
    100
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_files_per_run: 0,
            max_files_per_channel: 0,
            batch_size: default_batch_size(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.download_dir, PathBuf::from("./downloads"));
        assert_eq!(config.max_files_per_run, 0);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            download_dir = "/music"
        "#;
        let config: IngestConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/music"));
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            download_dir = "/music"
            max_files_per_run = 50
            max_files_per_channel = 10
            batch_size = 25
            hash_algorithm = "md5"
        "#;
        let config: IngestConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_files_per_run, 50);
        assert_eq!(config.max_files_per_channel, 10);
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Md5);
    }
}
