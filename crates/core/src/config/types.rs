use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::FilterConfig;
use crate::ingest::IngestConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Channel identifiers to ingest from. Empty means every channel the
    /// source exposes.
    #[serde(default)]
    pub channels: Vec<String>,

    #[serde(default)]
    pub download: IngestConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

/// State store locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_cursor_path")]
    pub cursor_path: PathBuf,

    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cursor_path: default_cursor_path(),
            artifact_path: default_artifact_path(),
        }
    }
}

fn default_cursor_path() -> PathBuf {
    PathBuf::from("state/cursor.json")
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("state/artifacts.json")
}
