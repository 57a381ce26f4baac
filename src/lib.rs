//! # Sync Convert Music Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `cli`: Parsing degli argomenti e costruzione della configurazione
//! - `config`: Parametri del run e validazione
//! - `error`: Tipi di errore custom
//! - `platform`: Attributi hidden / read-only / system per piattaforma
//! - `file_manager`: Enumerazione ricorsiva degli alberi
//! - `sync`: Snapshot, diff, esecuzione del piano e orchestrazione
//! - `encoder`: Encoder esterno (ffmpeg)
//! - `stats`: Statistiche del run
//! - `json_output`: Report JSON
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use sync_convert_music::{SyncConfig, Synchronizer};
//!
//! let synchronizer = Synchronizer::new(config)?;
//! synchronizer.run().await?;
//! ```

pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod platform;
pub mod stats;
pub mod sync;

pub use config::{SyncConfig, DESTINATION_EXTENSION};
pub use encoder::{Encoder, FfmpegEncoder};
pub use error::SyncError;
pub use stats::SyncStats;
pub use sync::{SyncOutcome, SyncPlan, Synchronizer};
