//! # File Management Module
//!
//! Questo modulo gestisce l'enumerazione ricorsiva degli alberi di directory.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di directory o file sotto una radice (profondità illimitata)
//! - Normalizzazione dei path relativi alla radice
//! - Esclusione delle entry hidden / read-only / system
//!
//! ## Regole di filtro:
//! - Vengono controllati solo gli attributi dell'entry stessa
//! - I figli di una directory esclusa vengono comunque testati singolarmente
//! - I link simbolici non vengono seguiti
//!
//! ## Esempio:
//! ```rust,ignore
//! let dirs = FileManager::enumerate(&root, EntryKind::Directory)?;
//! let files = FileManager::enumerate(&root, EntryKind::File)?;
//! ```

use crate::error::Result;
use crate::platform::EntryAttributes;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Which kind of entry an enumeration collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    fn matches(&self, entry: &DirEntry) -> bool {
        match self {
            EntryKind::Directory => entry.file_type().is_dir(),
            EntryKind::File => entry.file_type().is_file(),
        }
    }
}

/// Manages tree enumeration
pub struct FileManager;

impl FileManager {
    /// Enumerate every entry of `kind` under `root`, relative to `root`.
    ///
    /// Fails if the root is missing or any entry cannot be read.
    pub fn enumerate(root: &Path, kind: EntryKind) -> Result<HashSet<PathBuf>> {
        let mut paths = HashSet::new();

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = entry?;
            if !kind.matches(&entry) || !Self::include(&entry)? {
                continue;
            }

            // WalkDir yields paths prefixed by the root it was given
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            paths.insert(relative.to_path_buf());
        }

        debug!("Enumerated {} {:?} entries under {}", paths.len(), kind, root.display());
        Ok(paths)
    }

    /// False for entries carrying the hidden, read-only or system attribute
    pub fn include(entry: &DirEntry) -> Result<bool> {
        let metadata = entry.metadata()?;
        let attributes = EntryAttributes::of(entry.path(), &metadata);
        if !attributes.is_plain() {
            debug!("Excluding {} ({:?})", entry.path().display(), attributes);
        }
        Ok(attributes.is_plain())
    }
}
