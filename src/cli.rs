//! # Command Line Module
//!
//! Parsing degli argomenti con `clap` e conversione in `SyncConfig`.
//!
//! ## Responsabilità:
//! - Accetta i flag storici a trattino singolo (`-quality 2`) oltre a `--quality 2`
//! - Ogni flag consuma esattamente il valore successivo, anche se inizia con '-'
//! - Valida i valori (path non vuoti, estensione con '.') prima di qualsiasi I/O
//!
//! ## Esempio:
//! ```bash
//! sync-convert-music -quality 2 -source-directory ~/Music -dest-directory /mnt/player \
//!     -source-ext .flac -ffmpeg /usr/bin/ffmpeg
//! ```

use crate::config::{validate_extension, SyncConfig};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flags that are also accepted with a single leading dash
const SINGLE_DASH_FLAGS: &[&str] = &[
    "quality",
    "source-directory",
    "dest-directory",
    "source-ext",
    "ffmpeg",
];

#[derive(Parser, Debug)]
#[command(name = "sync-convert-music")]
#[command(about = "Mirror a music library, converting tracks to mp3 with ffmpeg")]
#[command(after_help = "Flags may also be written with a single dash, e.g. -quality 2 -source-ext .flac")]
pub struct Args {
    /// Quality of converted audio files, 0 (best) to 10
    #[arg(long, value_name = "x", allow_hyphen_values = true)]
    pub quality: i32,

    /// Source directory
    #[arg(long, value_name = "path", allow_hyphen_values = true, value_parser = parse_non_empty_path)]
    pub source_directory: PathBuf,

    /// Destination directory
    #[arg(long, value_name = "path", allow_hyphen_values = true, value_parser = parse_non_empty_path)]
    pub dest_directory: PathBuf,

    /// Source extension e.g. .flac, .wav
    #[arg(long, value_name = "ext", allow_hyphen_values = true, value_parser = parse_extension)]
    pub source_ext: String,

    /// Path to ffmpeg executable
    #[arg(long, value_name = "path", allow_hyphen_values = true, value_parser = parse_non_empty_path)]
    pub ffmpeg: PathBuf,

    /// Number of parallel conversions
    #[arg(long, default_value_t = SyncConfig::default_workers(), value_parser = parse_workers)]
    pub workers: usize,

    /// Dry run - compute and show the plan without touching the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Print the plan and the final statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse from raw process arguments, accepting single-dash long flags
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    pub fn into_config(self) -> SyncConfig {
        SyncConfig {
            quality: self.quality,
            source_dir: self.source_directory,
            dest_dir: self.dest_directory,
            source_ext: self.source_ext,
            encoder_path: self.ffmpeg,
            workers: self.workers,
            dry_run: self.dry_run,
            json_output: self.json,
        }
    }
}

/// Rewrite `-quality` style flags to `--quality`. The token following such
/// a flag is its value and is passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    if let Some(program) = args.next() {
        normalized.push(program);
    }

    while let Some(arg) = args.next() {
        let long = arg
            .to_str()
            .and_then(|s| s.strip_prefix('-'))
            .filter(|name| SINGLE_DASH_FLAGS.contains(name))
            .map(|name| OsString::from(format!("--{}", name)));

        match long {
            Some(flag) => {
                normalized.push(flag);
                if let Some(value) = args.next() {
                    normalized.push(value);
                }
            }
            None => normalized.push(arg),
        }
    }

    normalized
}

fn parse_non_empty_path(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(PathBuf::from(value))
}

fn parse_extension(value: &str) -> Result<String, String> {
    validate_extension(value).map_err(|e| e.to_string())?;
    Ok(value.to_string())
}

fn parse_workers(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &[&str] = &[
        "sync-convert-music",
        "-quality",
        "2",
        "-source-directory",
        "/music/flac",
        "-dest-directory",
        "/music/mp3",
        "-source-ext",
        ".flac",
        "-ffmpeg",
        "/usr/bin/ffmpeg",
    ];

    #[test]
    fn test_single_dash_flags() {
        let config = Args::try_parse_args(FULL).unwrap().into_config();
        assert_eq!(config.quality, 2);
        assert_eq!(config.source_dir, PathBuf::from("/music/flac"));
        assert_eq!(config.dest_dir, PathBuf::from("/music/mp3"));
        assert_eq!(config.source_ext, ".flac");
        assert_eq!(config.encoder_path, PathBuf::from("/usr/bin/ffmpeg"));
        assert!(!config.dry_run);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_any_order_and_double_dash() {
        let args = Args::try_parse_args([
            "sync-convert-music",
            "--ffmpeg",
            "ffmpeg",
            "-source-ext",
            ".wav",
            "--dest-directory",
            "out",
            "-quality",
            "0",
            "-source-directory",
            "in",
            "--workers",
            "3",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.source_ext, ".wav");
        assert_eq!(args.workers, 3);
        assert!(args.dry_run);
    }

    #[test]
    fn test_value_is_not_rewritten() {
        let normalized = normalize_args(["bin", "-source-directory", "-quality", "-quality", "5"]);
        let normalized: Vec<&str> = normalized.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(normalized, ["bin", "--source-directory", "-quality", "--quality", "5"]);
    }

    #[test]
    fn test_negative_quality_parses() {
        let mut args = FULL.to_vec();
        args[2] = "-1";
        let config = Args::try_parse_args(args).unwrap().into_config();
        assert_eq!(config.quality, -1);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut non_numeric = FULL.to_vec();
        non_numeric[2] = "high";
        assert!(Args::try_parse_args(non_numeric).is_err());

        let mut bad_ext = FULL.to_vec();
        bad_ext[8] = "flac";
        assert!(Args::try_parse_args(bad_ext).is_err());

        let mut empty_path = FULL.to_vec();
        empty_path[4] = "";
        assert!(Args::try_parse_args(empty_path).is_err());
    }

    #[test]
    fn test_missing_and_unknown_flags() {
        assert!(Args::try_parse_args(&FULL[..9]).is_err());
        assert!(Args::try_parse_args(&FULL[..2]).is_err());

        let mut unknown = FULL.to_vec();
        unknown.extend(["-bitrate", "320"]);
        assert!(Args::try_parse_args(unknown).is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut args = FULL.to_vec();
        args.extend(["--workers", "0"]);
        assert!(Args::try_parse_args(args).is_err());
    }
}
