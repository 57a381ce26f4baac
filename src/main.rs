//! # Sync Convert Music - Main Entry Point
//!
//! Punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Stampa l'usage se non vengono passati argomenti
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio del synchronizer
//!
//! ## Flusso di esecuzione:
//! 1. Nessun argomento: stampa l'usage su stdout ed esce senza errori
//! 2. Parsa gli argomenti CLI (un errore termina il processo con exit code != 0)
//! 3. Configura il logging su stderr (INFO o DEBUG a seconda del flag verbose)
//! 4. Crea `SyncConfig` e avvia la sincronizzazione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! sync-convert-music -quality 2 -source-directory ~/Music -dest-directory /mnt/player \
//!     -source-ext .flac -ffmpeg ffmpeg --verbose
//! ```

use anyhow::Result;
use clap::CommandFactory;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sync_convert_music::{cli::Args, json_output::JsonMessage, Synchronizer};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args_os().len() <= 1 {
        Args::command().print_help()?;
        return Ok(());
    }

    let args = match Args::try_parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.into_config();
    let json_output = config.json_output;

    let result = async {
        let synchronizer = Synchronizer::new(config)?;
        synchronizer.run().await
    }
    .await;

    if let Err(e) = result {
        if json_output {
            JsonMessage::error(&e).emit();
        }
        error!("Sync failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
