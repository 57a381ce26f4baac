//! # Diff Engine Module
//!
//! Calcola, a partire dalle due fotografie, il piano minimo di operazioni
//! per allineare la destinazione alla sorgente.
//!
//! ## Insiemi di operazioni:
//! - `dirs_to_create`: directory sorgente assenti in destinazione
//! - `dirs_to_delete`: directory di destinazione assenti in sorgente (più profonde prima)
//! - `files_to_delete`: tracce di destinazione senza corrispondente in sorgente
//! - `files_to_copy`: tracce già codificate in sorgente (".mp3")
//! - `files_to_convert`: tracce grezze da passare all'encoder
//!
//! ## Regole:
//! - L'uguaglianza tra alberi è per identità (path relativo senza estensione)
//! - Copy e convert scelgono la variante tra i file inclusi nella fotografia
//!   sorgente: una variante esclusa (hidden / read-only / system) non viene
//!   mai copiata né convertita
//! - Una directory di destinazione che contiene ancora directory o tracce
//!   sorgente non viene cancellata, anche se la directory sorgente
//!   corrispondente è esclusa
//! - Se in sorgente esistono sia la versione grezza che quella codificata,
//!   vince la copia e non viene schedulata nessuna conversione

use crate::{
    config::{SyncConfig, DESTINATION_EXTENSION},
    error::{Result, SyncError},
    sync::{path_resolver::PathResolver, snapshot::TreeSnapshot},
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file to materialize in the destination tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Operation sets for one run. All paths are absolute (joined to their root).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub dirs_to_create: Vec<PathBuf>,
    /// Deepest first
    pub dirs_to_delete: Vec<PathBuf>,
    pub files_to_delete: Vec<PathBuf>,
    pub files_to_copy: Vec<FileTransfer>,
    pub files_to_convert: Vec<FileTransfer>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    pub fn operation_count(&self) -> usize {
        self.dirs_to_create.len()
            + self.dirs_to_delete.len()
            + self.files_to_delete.len()
            + self.files_to_copy.len()
            + self.files_to_convert.len()
    }

    /// Fail if a destination file is targeted by more than one of
    /// delete / copy / convert.
    pub fn check_disjoint(&self) -> Result<()> {
        let mut targets = HashSet::new();
        let destinations = self
            .files_to_delete
            .iter()
            .chain(self.files_to_copy.iter().map(|t| &t.destination))
            .chain(self.files_to_convert.iter().map(|t| &t.destination));

        for destination in destinations {
            if !targets.insert(destination) {
                return Err(SyncError::PlanConflict(destination.clone()));
            }
        }
        Ok(())
    }
}

/// Computes a `SyncPlan` from two snapshots
pub struct DiffEngine<'a> {
    source_root: &'a Path,
    dest_root: &'a Path,
    source_ext: &'a str,
}

impl<'a> DiffEngine<'a> {
    pub fn new(source_root: &'a Path, dest_root: &'a Path, source_ext: &'a str) -> Self {
        Self {
            source_root,
            dest_root,
            source_ext,
        }
    }

    pub fn for_config(config: &'a SyncConfig) -> Self {
        Self::new(&config.source_dir, &config.dest_dir, &config.source_ext)
    }

    /// Plan choosing variants among the files kept in the source snapshot
    pub fn plan(&self, source: &TreeSnapshot, destination: &TreeSnapshot) -> SyncPlan {
        self.plan_with(source, destination, |path| {
            path.strip_prefix(self.source_root)
                .map(|relative| source.contains_entry(relative))
                .unwrap_or(false)
        })
    }

    /// Plan using `exists` to check which variant of a track is on disk
    pub fn plan_with<F>(&self, source: &TreeSnapshot, destination: &TreeSnapshot, exists: F) -> SyncPlan
    where
        F: Fn(&Path) -> bool,
    {
        let mut dirs_to_create: Vec<PathBuf> = source
            .dirs()
            .difference(destination.dirs())
            .map(|dir| self.dest_root.join(dir))
            .collect();
        dirs_to_create.sort();

        let still_needed = source_ancestors(source);
        let mut dirs_to_delete: Vec<PathBuf> = destination
            .dirs()
            .difference(source.dirs())
            .filter(|dir| !still_needed.contains(dir.as_path()))
            .map(|dir| self.dest_root.join(dir))
            .collect();
        // A longer path is never an ancestor of a shorter one
        dirs_to_delete.sort_by(|a, b| {
            b.as_os_str()
                .len()
                .cmp(&a.as_os_str().len())
                .then_with(|| b.cmp(a))
        });

        let mut files_to_delete: Vec<PathBuf> = destination
            .files()
            .difference(source.files())
            .map(|identity| PathResolver::resolve(self.dest_root, identity, DESTINATION_EXTENSION))
            .collect();
        files_to_delete.sort();

        let mut missing: Vec<&PathBuf> = source.files().difference(destination.files()).collect();
        missing.sort();

        let mut files_to_copy = Vec::new();
        let mut files_to_convert = Vec::new();
        for identity in missing {
            let target = PathResolver::resolve(self.dest_root, identity, DESTINATION_EXTENSION);

            let encoded = PathResolver::resolve(self.source_root, identity, DESTINATION_EXTENSION);
            if exists(&encoded) {
                files_to_copy.push(FileTransfer {
                    source: encoded,
                    destination: target,
                });
                continue;
            }

            let raw = PathResolver::resolve(self.source_root, identity, self.source_ext);
            if exists(&raw) {
                files_to_convert.push(FileTransfer {
                    source: raw,
                    destination: target,
                });
            } else {
                debug!("No file on disk for track {}, skipping", identity.display());
            }
        }

        let plan = SyncPlan {
            dirs_to_create,
            dirs_to_delete,
            files_to_delete,
            files_to_copy,
            files_to_convert,
        };
        debug!(
            "Plan: {} dirs to create, {} dirs to delete, {} files to delete, {} to copy, {} to convert",
            plan.dirs_to_create.len(),
            plan.dirs_to_delete.len(),
            plan.files_to_delete.len(),
            plan.files_to_copy.len(),
            plan.files_to_convert.len()
        );
        plan
    }
}

/// Every proper ancestor of a source directory or track. Such a directory
/// may be missing from the source snapshot only because it was filtered out.
fn source_ancestors(source: &TreeSnapshot) -> HashSet<&Path> {
    source
        .dirs()
        .iter()
        .chain(source.files())
        .flat_map(|path| path.ancestors().skip(1))
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .collect()
}
