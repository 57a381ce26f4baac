//! # Tree Snapshot Module
//!
//! Fotografia di un albero: insieme delle directory relative e insieme
//! delle identità dei file (path relativo senza estensione).
//!
//! ## Responsabilità:
//! - Sorgente: identità dei file con estensione sorgente **e** ".mp3"
//!   (una traccia esiste se è presente grezza o già codificata)
//! - Destinazione: identità dei soli file ".mp3"
//! - Conserva i path relativi dei file inclusi, così il diff sceglie la
//!   variante da copiare o convertire solo tra le entry non escluse

use crate::{
    config::DESTINATION_EXTENSION,
    error::Result,
    file_manager::{EntryKind, FileManager},
    sync::path_resolver::PathResolver,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory paths and file identities discovered by one walk of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    dirs: HashSet<PathBuf>,
    files: HashSet<PathBuf>,
    /// Relative paths (with extension) of the files behind `files`
    entries: HashSet<PathBuf>,
}

impl TreeSnapshot {
    pub fn new(dirs: HashSet<PathBuf>, files: HashSet<PathBuf>) -> Self {
        Self {
            dirs,
            files,
            entries: HashSet::new(),
        }
    }

    /// Attach the relative file paths the identities were derived from
    pub fn with_entries(mut self, entries: HashSet<PathBuf>) -> Self {
        self.entries = entries;
        self
    }

    /// Snapshot of a tree that does not exist yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of the source tree
    pub fn source(root: &Path, source_ext: &str) -> Result<Self> {
        let dirs = FileManager::enumerate(root, EntryKind::Directory)?;
        let all_files = FileManager::enumerate(root, EntryKind::File)?;
        let (files, entries) = Self::identities(all_files, &[source_ext, DESTINATION_EXTENSION]);

        debug!(
            "Source snapshot of {}: {} directories, {} tracks",
            root.display(),
            dirs.len(),
            files.len()
        );
        Ok(Self { dirs, files, entries })
    }

    /// Snapshot of the destination tree
    pub fn destination(root: &Path) -> Result<Self> {
        let dirs = FileManager::enumerate(root, EntryKind::Directory)?;
        let all_files = FileManager::enumerate(root, EntryKind::File)?;
        let (files, entries) = Self::identities(all_files, &[DESTINATION_EXTENSION]);

        debug!(
            "Destination snapshot of {}: {} directories, {} tracks",
            root.display(),
            dirs.len(),
            files.len()
        );
        Ok(Self { dirs, files, entries })
    }

    pub fn dirs(&self) -> &HashSet<PathBuf> {
        &self.dirs
    }

    pub fn files(&self) -> &HashSet<PathBuf> {
        &self.files
    }

    /// True if `relative` is a file that survived the attribute filter
    pub fn contains_entry(&self, relative: &Path) -> bool {
        self.entries.contains(relative)
    }

    /// Identities of the files carrying one of `extensions`, plus the
    /// matching files themselves
    fn identities(files: HashSet<PathBuf>, extensions: &[&str]) -> (HashSet<PathBuf>, HashSet<PathBuf>) {
        let mut identities = HashSet::new();
        let mut entries = HashSet::new();
        for relative in files {
            if relative.file_name().and_then(|name| name.to_str()).is_none() {
                warn!("Skipping file with a non UTF-8 name: {}", relative.display());
                continue;
            }
            let matched: Vec<PathBuf> = extensions
                .iter()
                .filter_map(|ext| PathResolver::identity(&relative, ext))
                .collect();
            if matched.is_empty() {
                continue;
            }
            identities.extend(matched);
            entries.insert(relative);
        }
        (identities, entries)
    }
}
