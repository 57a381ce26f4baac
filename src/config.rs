//! # Configuration Management Module
//!
//! Questo modulo gestisce i parametri di una singola sincronizzazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `SyncConfig` con tutti i parametri del run
//! - Definisce la costante `DESTINATION_EXTENSION` (non configurabile)
//! - Fornisce validazione dei parametri prima di qualsiasi modifica al filesystem
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità VBR dell'encoder (intervallo previsto 0-10)
//! - `source_dir` / `dest_dir`: Radici degli alberi sorgente e destinazione
//! - `source_ext`: Estensione dei file da convertire (es. ".flac")
//! - `encoder_path`: Path dell'eseguibile ffmpeg
//! - `workers`: Numero di conversioni parallele
//! - `dry_run`: Calcola e mostra il piano senza applicarlo
//! - `json_output`: Stampa il report del run in JSON su stdout
//!
//! ## Validazione:
//! - `source_ext` deve iniziare con '.' e differire da ".mp3"
//! - I path non possono essere vuoti
//! - `workers` deve essere > 0
//! - La directory sorgente deve esistere

use crate::error::{Result, SyncError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Extension of every file written to the destination tree.
pub const DESTINATION_EXTENSION: &str = ".mp3";

/// Quality range understood by the encoder (lower is better)
pub const QUALITY_RANGE: std::ops::RangeInclusive<i32> = 0..=10;

/// Configuration for one synchronization run
#[derive(Debug, Clone, Serialize)]
pub struct SyncConfig {
    /// Encoder VBR quality
    pub quality: i32,
    /// Root of the tree to mirror
    pub source_dir: PathBuf,
    /// Root of the mirrored tree
    pub dest_dir: PathBuf,
    /// Extension of files to transcode, including the leading dot
    pub source_ext: String,
    /// Path to the ffmpeg executable
    pub encoder_path: PathBuf,
    /// Number of concurrent conversions
    pub workers: usize,
    /// Compute and report the plan without touching the destination
    pub dry_run: bool,
    /// Emit the run report as JSON on stdout
    pub json_output: bool,
}

impl SyncConfig {
    /// Default worker count: one conversion per available core
    pub fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        validate_extension(&self.source_ext)?;

        if self.source_dir.as_os_str().is_empty() {
            return Err(SyncError::Config("source directory must not be empty".into()));
        }

        if self.dest_dir.as_os_str().is_empty() {
            return Err(SyncError::Config("destination directory must not be empty".into()));
        }

        if self.encoder_path.as_os_str().is_empty() {
            return Err(SyncError::Config("encoder path must not be empty".into()));
        }

        if self.workers == 0 {
            return Err(SyncError::Config("Number of workers must be greater than 0".into()));
        }

        if !self.source_dir.is_dir() {
            return Err(SyncError::Config(format!(
                "Source directory does not exist: {}",
                self.source_dir.display()
            )));
        }

        if self.dest_dir.exists() && !self.dest_dir.is_dir() {
            return Err(SyncError::Config(format!(
                "Destination path is not a directory: {}",
                self.dest_dir.display()
            )));
        }

        if !QUALITY_RANGE.contains(&self.quality) {
            warn!(
                "Quality {} is outside the expected range [{}, {}], passing it to the encoder as is",
                self.quality,
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end()
            );
        }

        Ok(())
    }
}

/// Check a source extension: non-empty, dotted, not the destination one.
pub fn validate_extension(ext: &str) -> Result<()> {
    if ext.is_empty() {
        return Err(SyncError::Config(
            "missing -source-ext value, should use -source-ext <ext>".into(),
        ));
    }
    if !ext.starts_with('.') || ext.len() == 1 {
        return Err(SyncError::Config("-source-ext value should start with '.'".into()));
    }
    if ext.eq_ignore_ascii_case(DESTINATION_EXTENSION) {
        return Err(SyncError::Config(format!(
            "-source-ext must differ from the destination extension {}",
            DESTINATION_EXTENSION
        )));
    }
    Ok(())
}
