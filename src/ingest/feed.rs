//! JSON-file feed for the two oracle outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::ground_truth::GroundTruthRecord;
use super::MatchFeed;
use crate::extract::SegmentObservation;

/// Reads ground truth and commentary from two JSON array files
pub struct JsonFileFeed {
    ground_truth_path: PathBuf,
    commentary_path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(ground_truth_path: impl Into<PathBuf>, commentary_path: impl Into<PathBuf>) -> Self {
        Self {
            ground_truth_path: ground_truth_path.into(),
            commentary_path: commentary_path.into(),
        }
    }
}

/// Read a whole JSON array file into records
pub async fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read feed file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse feed file: {}", path.display()))
}

#[async_trait]
impl MatchFeed for JsonFileFeed {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn ground_truth(&self) -> Result<Vec<GroundTruthRecord>> {
        read_json_array(&self.ground_truth_path).await
    }

    async fn commentary(&self) -> Result<Vec<SegmentObservation>> {
        read_json_array(&self.commentary_path).await
    }
}
