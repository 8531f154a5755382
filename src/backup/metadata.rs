use crate::infra::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Record describing one snapshot. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the snapshot bytes at creation time.
    pub checksum: ContentHash,
    pub notes_count: usize,
    pub file_path: PathBuf,
}
