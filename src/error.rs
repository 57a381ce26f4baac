//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della sincronizzazione.
//!
//! ## Responsabilità:
//! - Definisce `SyncError` enum per categorizzare tutti gli errori possibili
//! - Mantiene il path coinvolto negli errori di I/O per messaggi utili
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Config`: Parametri non validi (rilevati prima di toccare il filesystem)
//! - `Io`: Errori di create/delete/copy su un path specifico
//! - `Walk`: Errori durante l'enumerazione ricorsiva di un albero
//! - `EncoderLaunch` / `EncoderFailed` / `EncoderTimeout`: Errori dell'encoder esterno
//! - `PlanConflict`: Due operazioni puntano allo stesso file di destinazione
//!
//! ## Esempio:
//! ```rust,ignore
//! if !extension.starts_with('.') {
//!     return Err(SyncError::Config("-source-ext value should start with '.'".into()));
//! }
//! ```

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Custom error types for library synchronization
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to launch encoder {}", .program.display())]
    EncoderLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoder failed on {} ({status}): {stderr}", .source_path.display())]
    EncoderFailed {
        source_path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Encoder timed out after {timeout:?} on {}", .source_path.display())]
    EncoderTimeout {
        source_path: PathBuf,
        timeout: Duration,
    },

    #[error("Destination path scheduled by more than one operation: {}", .0.display())]
    PlanConflict(PathBuf),
}

impl SyncError {
    /// Attach the offending path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
