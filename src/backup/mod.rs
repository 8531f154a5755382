//! Checksum-verified snapshots of the notes file.

mod error;
mod manager;
mod metadata;

pub use error::BackupError;
pub use manager::{BackupManager, METADATA_FILE, STATE_FILE};
pub use metadata::BackupMetadata;
