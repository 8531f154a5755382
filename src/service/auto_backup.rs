use serde::{Deserialize, Serialize};
use thiserror::Error;

/// When the service snapshots the notes file on its own.
///
/// With `enabled`, every `max_modifications` mutations trigger a backup,
/// after which only the newest `max_backups` snapshots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoBackupConfig {
    pub enabled: bool,
    pub max_modifications: u32,
    pub max_backups: usize,
}

impl Default for AutoBackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_modifications: 10,
            max_backups: 5,
        }
    }
}

/// A threshold of zero.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("auto_backup.{field} must be at least 1")]
pub struct InvalidAutoBackupConfig {
    pub field: &'static str,
}

impl AutoBackupConfig {
    /// Enabled configuration with the given thresholds.
    pub fn enabled(max_modifications: u32, max_backups: usize) -> Self {
        Self {
            enabled: true,
            max_modifications,
            max_backups,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidAutoBackupConfig> {
        if self.max_modifications == 0 {
            return Err(InvalidAutoBackupConfig {
                field: "max_modifications",
            });
        }
        if self.max_backups == 0 {
            return Err(InvalidAutoBackupConfig {
                field: "max_backups",
            });
        }
        Ok(())
    }
}
