//! # Sync Module
//!
//! Modulo che separa le responsabilità della riconciliazione in sottomoduli:
//! - `snapshot`: Fotografia di un albero (directory + identità dei file)
//! - `diff`: Calcolo del piano di operazioni
//! - `executor`: Applicazione del piano fase per fase
//! - `synchronizer`: Orchestratore principale
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod diff;
pub mod executor;
pub mod path_resolver;
pub mod snapshot;
pub mod synchronizer;

pub use diff::{DiffEngine, FileTransfer, SyncPlan};
pub use executor::PlanExecutor;
pub use path_resolver::PathResolver;
pub use snapshot::TreeSnapshot;
pub use synchronizer::{SyncOutcome, Synchronizer};
