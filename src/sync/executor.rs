//! # Plan Executor Module
//!
//! Applica un `SyncPlan` alla destinazione rispettando l'ordine delle fasi.
//!
//! ## Fasi (la radice di destinazione esiste già):
//! 1. Creazione delle directory mancanti
//! 2. Cancellazione dei file obsoleti
//! 3. Cancellazione delle directory obsolete, più profonde prima
//! 4. Copia dei file già codificati
//! 5. Conversione parallela delle tracce grezze
//!
//! ## Gestione concorrenza:
//! - Solo la conversione è concorrente, con al massimo `workers` encoder attivi
//! - Il primo errore interrompe il run: le conversioni pendenti non partono
//!   e quelle in corso vengono terminate
//!
//! ## Dry run mode:
//! - Ogni operazione viene solo loggata

use crate::{
    encoder::Encoder,
    error::{Result, SyncError},
    stats::SyncStats,
    sync::diff::{FileTransfer, SyncPlan},
};
use futures::TryStreamExt;
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

/// Applies a plan with a given encoder
pub struct PlanExecutor<'a, E: Encoder> {
    encoder: &'a E,
    workers: usize,
    dry_run: bool,
}

impl<'a, E: Encoder> PlanExecutor<'a, E> {
    pub fn new(encoder: &'a E, workers: usize, dry_run: bool) -> Self {
        Self {
            encoder,
            workers: workers.max(1),
            dry_run,
        }
    }

    /// Run every phase in order
    pub async fn execute(&self, plan: &SyncPlan) -> Result<SyncStats> {
        plan.check_disjoint()?;

        let start_time = Instant::now();
        let mut stats = SyncStats::new();

        stats.dirs_created = self.create_dirs(plan).await?;
        stats.files_deleted = self.delete_files(plan).await?;
        stats.dirs_deleted = self.delete_dirs(plan).await?;
        stats.files_copied = self.copy_files(plan).await?;
        stats.files_converted = self.convert_files(plan).await?;

        stats.duration_seconds = start_time.elapsed().as_secs_f64();
        Ok(stats)
    }

    async fn create_dirs(&self, plan: &SyncPlan) -> Result<usize> {
        for dir in &plan.dirs_to_create {
            debug!("Creating directory {}", dir.display());
            if !self.dry_run {
                // Ancestors may be missing when they were filtered out of the source snapshot
                fs::create_dir_all(dir).await.map_err(|e| SyncError::io(dir, e))?;
            }
        }
        Ok(plan.dirs_to_create.len())
    }

    async fn delete_files(&self, plan: &SyncPlan) -> Result<usize> {
        for file in &plan.files_to_delete {
            debug!("Deleting file {}", file.display());
            if !self.dry_run {
                fs::remove_file(file).await.map_err(|e| SyncError::io(file, e))?;
            }
        }
        Ok(plan.files_to_delete.len())
    }

    async fn delete_dirs(&self, plan: &SyncPlan) -> Result<usize> {
        for dir in &plan.dirs_to_delete {
            debug!("Deleting directory {}", dir.display());
            if !self.dry_run {
                fs::remove_dir(dir).await.map_err(|e| SyncError::io(dir, e))?;
            }
        }
        Ok(plan.dirs_to_delete.len())
    }

    async fn copy_files(&self, plan: &SyncPlan) -> Result<usize> {
        for transfer in &plan.files_to_copy {
            debug!(
                "Copying {} -> {}",
                transfer.source.display(),
                transfer.destination.display()
            );
            if !self.dry_run {
                fs::copy(&transfer.source, &transfer.destination)
                    .await
                    .map_err(|e| SyncError::io(&transfer.source, e))?;
            }
        }
        Ok(plan.files_to_copy.len())
    }

    async fn convert_files(&self, plan: &SyncPlan) -> Result<usize> {
        if plan.files_to_convert.is_empty() {
            return Ok(0);
        }

        info!(
            "Converting {} files with {} workers",
            plan.files_to_convert.len(),
            self.workers
        );

        futures::stream::iter(plan.files_to_convert.iter().map(Ok::<_, SyncError>))
            .try_for_each_concurrent(self.workers, |transfer| self.convert(transfer))
            .await?;

        Ok(plan.files_to_convert.len())
    }

    async fn convert(&self, transfer: &FileTransfer) -> Result<()> {
        if self.dry_run {
            debug!(
                "Dry run: would convert {} -> {}",
                transfer.source.display(),
                transfer.destination.display()
            );
            return Ok(());
        }

        match self.encoder.encode(&transfer.source, &transfer.destination).await {
            Ok(()) => {
                debug!("[OK] {}", transfer.destination.display());
                Ok(())
            }
            Err(e) => {
                // A leftover output would match by identity and never be redone
                remove_partial_output(&transfer.destination).await;
                Err(e)
            }
        }
    }
}

async fn remove_partial_output(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Copies the source to the destination and records every call
    #[derive(Default)]
    struct RecordingEncoder {
        calls: Mutex<Vec<(PathBuf, PathBuf)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail_on: Option<PathBuf>,
    }

    impl Encoder for RecordingEncoder {
        fn encode<'a>(&'a self, source: &'a Path, destination: &'a Path) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                self.calls
                    .lock()
                    .unwrap()
                    .push((source.to_path_buf(), destination.to_path_buf()));

                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                fs::copy(source, destination)
                    .await
                    .map_err(|e| SyncError::io(source, e))?;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if self.fail_on.as_deref() == Some(source) {
                    return Err(SyncError::Config("encoder exploded".into()));
                }
                Ok(())
            })
        }
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"audio").unwrap();
    }

    fn transfer(source: PathBuf, destination: PathBuf) -> FileTransfer {
        FileTransfer { source, destination }
    }

    #[tokio::test]
    async fn test_phases_are_applied() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(&src.path().join("a/raw.flac"));
        touch(&src.path().join("a/encoded.mp3"));
        touch(&dst.path().join("b/c/old.mp3"));

        let plan = SyncPlan {
            dirs_to_create: vec![dst.path().join("a")],
            dirs_to_delete: vec![dst.path().join("b/c"), dst.path().join("b")],
            files_to_delete: vec![dst.path().join("b/c/old.mp3")],
            files_to_copy: vec![transfer(src.path().join("a/encoded.mp3"), dst.path().join("a/encoded.mp3"))],
            files_to_convert: vec![transfer(src.path().join("a/raw.flac"), dst.path().join("a/raw.mp3"))],
        };

        let encoder = RecordingEncoder::default();
        let stats = PlanExecutor::new(&encoder, 2, false).execute(&plan).await.unwrap();

        assert!(dst.path().join("a/encoded.mp3").is_file());
        assert!(dst.path().join("a/raw.mp3").is_file());
        assert!(!dst.path().join("b").exists());
        assert_eq!(stats.dirs_created, 1);
        assert_eq!(stats.dirs_deleted, 2);
        assert_eq!(stats.files_deleted, 1);
        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.files_converted, 1);
        assert_eq!(encoder.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(&src.path().join("a/raw.flac"));
        touch(&dst.path().join("b/old.mp3"));

        let plan = SyncPlan {
            dirs_to_create: vec![dst.path().join("a")],
            dirs_to_delete: vec![dst.path().join("b")],
            files_to_delete: vec![dst.path().join("b/old.mp3")],
            files_to_convert: vec![transfer(src.path().join("a/raw.flac"), dst.path().join("a/raw.mp3"))],
            ..Default::default()
        };

        let encoder = RecordingEncoder::default();
        let stats = PlanExecutor::new(&encoder, 2, true).execute(&plan).await.unwrap();

        assert_eq!(stats.total_operations(), 4);
        assert!(!dst.path().join("a").exists());
        assert!(dst.path().join("b/old.mp3").is_file());
        assert!(encoder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversion_concurrency_is_bounded() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let files_to_convert = (0..12)
            .map(|i| {
                let source = src.path().join(format!("t{}.flac", i));
                touch(&source);
                transfer(source, dst.path().join(format!("t{}.mp3", i)))
            })
            .collect();
        let plan = SyncPlan {
            files_to_convert,
            ..Default::default()
        };

        let encoder = RecordingEncoder::default();
        let stats = PlanExecutor::new(&encoder, 3, false).execute(&plan).await.unwrap();

        assert_eq!(stats.files_converted, 12);
        assert_eq!(encoder.calls.lock().unwrap().len(), 12);
        assert!(encoder.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_failed_conversion_aborts_and_cleans_output() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let bad = src.path().join("bad.flac");
        touch(&bad);

        let plan = SyncPlan {
            files_to_convert: vec![transfer(bad.clone(), dst.path().join("bad.mp3"))],
            ..Default::default()
        };

        let encoder = RecordingEncoder {
            fail_on: Some(bad),
            ..Default::default()
        };
        let result = PlanExecutor::new(&encoder, 1, false).execute(&plan).await;

        assert!(result.is_err());
        assert!(!dst.path().join("bad.mp3").exists());
    }

    #[tokio::test]
    async fn test_non_empty_directory_delete_fails() {
        let dst = TempDir::new().unwrap();
        touch(&dst.path().join("b/cover.jpg"));

        let plan = SyncPlan {
            dirs_to_delete: vec![dst.path().join("b")],
            ..Default::default()
        };

        let encoder = RecordingEncoder::default();
        let result = PlanExecutor::new(&encoder, 1, false).execute(&plan).await;
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }

    #[tokio::test]
    async fn test_conflicting_plan_is_refused() {
        let dst = TempDir::new().unwrap();
        let target = dst.path().join("a.mp3");
        let plan = SyncPlan {
            files_to_copy: vec![transfer(PathBuf::from("x.mp3"), target.clone())],
            files_to_convert: vec![transfer(PathBuf::from("x.flac"), target)],
            ..Default::default()
        };

        let encoder = RecordingEncoder::default();
        let result = PlanExecutor::new(&encoder, 1, false).execute(&plan).await;
        assert!(matches!(result, Err(SyncError::PlanConflict(_))));
        assert!(encoder.calls.lock().unwrap().is_empty());
    }
}
