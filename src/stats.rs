//! # Run Statistics Module
//!
//! Tiene il conto delle operazioni applicate durante un run e produce
//! il riepilogo finale.

use serde::Serialize;

/// Statistics tracker for one synchronization run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SyncStats {
    pub dirs_created: usize,
    pub dirs_deleted: usize,
    pub files_deleted: usize,
    pub files_copied: usize,
    pub files_converted: usize,
    pub duration_seconds: f64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_operations(&self) -> usize {
        self.dirs_created + self.dirs_deleted + self.files_deleted + self.files_copied + self.files_converted
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Directories: +{} -{} | Files deleted: {} | Copied: {} | Converted: {} | Took {:.1}s",
            self.dirs_created,
            self.dirs_deleted,
            self.files_deleted,
            self.files_copied,
            self.files_converted,
            self.duration_seconds
        )
    }
}
