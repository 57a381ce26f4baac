//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso da script.
//!
//! ## Responsabilità:
//! - Emette su stdout il piano calcolato e le statistiche finali
//! - Emette un messaggio di errore strutturato se il run fallisce
//!
//! ## Tipi di messaggi:
//! - `plan`: Piano calcolato (prima dell'esecuzione)
//! - `complete`: Fine del run con statistiche
//! - `error`: Errore fatale

use crate::{config::SyncConfig, stats::SyncStats, sync::SyncPlan};
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage<'a> {
    /// Piano di sincronizzazione calcolato
    #[serde(rename = "plan")]
    Plan {
        config: JsonConfig,
        plan: &'a SyncPlan,
    },

    /// Run completato
    #[serde(rename = "complete")]
    Complete { dry_run: bool, stats: &'a SyncStats },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub source_ext: String,
    pub quality: i32,
    pub workers: usize,
    pub dry_run: bool,
}

impl<'a> JsonMessage<'a> {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn plan(config: &SyncConfig, plan: &'a SyncPlan) -> Self {
        Self::Plan {
            config: JsonConfig::from(config),
            plan,
        }
    }

    pub fn complete(dry_run: bool, stats: &'a SyncStats) -> Self {
        Self::Complete { dry_run, stats }
    }

    /// Crea un messaggio di errore a partire dalla catena di cause
    pub fn error(error: &anyhow::Error) -> Self {
        let causes: Vec<String> = error.chain().skip(1).map(|cause| cause.to_string()).collect();
        Self::Error {
            message: error.to_string(),
            details: (!causes.is_empty()).then(|| causes.join(": ")),
        }
    }
}

impl From<&SyncConfig> for JsonConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            dest_dir: config.dest_dir.clone(),
            source_ext: config.source_ext.clone(),
            quality: config.quality,
            workers: config.workers,
            dry_run: config.dry_run,
        }
    }
}
