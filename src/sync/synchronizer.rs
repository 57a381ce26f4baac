//! # Synchronizer Main Orchestrator
//!
//! Orchestratore principale di un run: prepara la destinazione, fotografa
//! i due alberi, calcola il piano e lo delega al `PlanExecutor`.
//!
//! ## Flusso di esecuzione:
//! 1. **Preparazione**: crea la radice di destinazione se manca
//! 2. **Snapshot**: fotografa sorgente e destinazione
//! 3. **Diff**: calcola il `SyncPlan`
//! 4. **Dependency check**: verifica l'encoder solo se ci sono conversioni
//! 5. **Esecuzione**: applica il piano fase per fase
//! 6. **Reporting**: log finale (o JSON) con le statistiche
//!
//! ## Esempio:
//! ```rust,ignore
//! let synchronizer = Synchronizer::new(config)?;
//! let outcome = synchronizer.run().await?;
//! ```

use crate::{
    config::SyncConfig,
    encoder::{Encoder, FfmpegEncoder},
    json_output::JsonMessage,
    stats::SyncStats,
    sync::{diff::DiffEngine, executor::PlanExecutor, snapshot::TreeSnapshot, SyncPlan},
};
use anyhow::{Context, Result};
use tracing::info;

/// Plan and statistics of a completed run
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub plan: SyncPlan,
    pub stats: SyncStats,
}

/// Orchestratore principale
pub struct Synchronizer<E: Encoder = FfmpegEncoder> {
    config: SyncConfig,
    encoder: E,
}

impl Synchronizer<FfmpegEncoder> {
    /// Crea un synchronizer che usa ffmpeg come encoder
    pub fn new(config: SyncConfig) -> Result<Self> {
        let encoder = FfmpegEncoder::new(config.encoder_path.clone(), config.quality);
        Self::with_encoder(config, encoder)
    }
}

impl<E: Encoder> Synchronizer<E> {
    /// Crea un synchronizer con un encoder arbitrario
    pub fn with_encoder(config: SyncConfig, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Esegue un run completo
    pub async fn run(&self) -> Result<SyncOutcome> {
        self.log_configuration();

        if !self.config.dry_run {
            self.ensure_destination_root().await?;
        }

        let plan = self.compute_plan()?;
        if self.config.json_output {
            JsonMessage::plan(&self.config, &plan).emit();
        }

        if plan.is_empty() {
            info!("Destination is already in sync");
        } else {
            info!(
                "Plan: {} dirs to create, {} dirs to delete, {} files to delete, {} to copy, {} to convert",
                plan.dirs_to_create.len(),
                plan.dirs_to_delete.len(),
                plan.files_to_delete.len(),
                plan.files_to_copy.len(),
                plan.files_to_convert.len()
            );
        }

        if !plan.files_to_convert.is_empty() && !self.config.dry_run {
            self.encoder
                .check_available()
                .context("Encoder is not available")?;
        }

        let executor = PlanExecutor::new(&self.encoder, self.config.workers, self.config.dry_run);
        let stats = executor
            .execute(&plan)
            .await
            .with_context(|| format!("Failed to sync {}", self.config.dest_dir.display()))?;

        self.print_final_stats(&stats);
        Ok(SyncOutcome { plan, stats })
    }

    /// Fotografa i due alberi e calcola il piano senza applicarlo
    pub fn compute_plan(&self) -> Result<SyncPlan> {
        let source = TreeSnapshot::source(&self.config.source_dir, &self.config.source_ext)
            .with_context(|| format!("Failed to scan source {}", self.config.source_dir.display()))?;

        // Only reachable in dry run: nothing exists yet on the destination side
        let destination = if self.config.dest_dir.exists() {
            TreeSnapshot::destination(&self.config.dest_dir).with_context(|| {
                format!("Failed to scan destination {}", self.config.dest_dir.display())
            })?
        } else {
            TreeSnapshot::empty()
        };

        Ok(DiffEngine::for_config(&self.config).plan(&source, &destination))
    }

    async fn ensure_destination_root(&self) -> Result<()> {
        let dest_dir = &self.config.dest_dir;
        if !dest_dir.exists() {
            tokio::fs::create_dir_all(dest_dir)
                .await
                .with_context(|| format!("Failed to create {}", dest_dir.display()))?;
            info!("Created destination directory: {}", dest_dir.display());
        }
        Ok(())
    }

    fn log_configuration(&self) {
        if self.config.json_output {
            return;
        }

        info!(
            "Syncing {} -> {}",
            self.config.source_dir.display(),
            self.config.dest_dir.display()
        );
        info!(
            "Converting *{} with quality {} ({} workers)",
            self.config.source_ext, self.config.quality, self.config.workers
        );
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
    }

    fn print_final_stats(&self, stats: &SyncStats) {
        if self.config.json_output {
            JsonMessage::complete(self.config.dry_run, stats).emit();
        } else {
            info!("=== Sync Complete ===");
            info!("{}", stats.format_summary());
        }
    }
}
