//! # Encoder Module
//!
//! Questo modulo incapsula l'encoder esterno (ffmpeg) che converte una
//! singola traccia nel formato di destinazione.
//!
//! ## Responsabilità:
//! - Costruzione della riga di comando ffmpeg
//! - Avvio del processo e attesa della sua terminazione
//! - Verifica dell'exit status e raccolta dello stderr in caso di errore
//! - Verifica preliminare che l'eseguibile sia raggiungibile
//!
//! ## Comando:
//! ```bash
//! ffmpeg -loglevel error -y -i <source> -vn -codec:a libmp3lame -q:a <quality> <destination>
//! ```
//!
//! ## Ciclo di vita del processo:
//! - Il processo figlio appartiene al future di `encode`: se il future viene
//!   droppato (run abortito, timeout) il processo viene terminato
//! - Exit status diverso da zero è un errore fatale per il run

use crate::error::{Result, SyncError};
use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Number of stderr lines kept in an `EncoderFailed` error
const STDERR_TAIL_LINES: usize = 10;

/// Something that turns one source track into one destination track
pub trait Encoder: Send + Sync {
    /// Encode `source` into `destination`, resolving once the output is written
    fn encode<'a>(&'a self, source: &'a Path, destination: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// Fail early if the encoder cannot be run at all
    fn check_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Runs an ffmpeg-compatible executable with libmp3lame
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    quality: i32,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(program: PathBuf, quality: i32) -> Self {
        Self {
            program,
            quality,
            timeout: None,
        }
    }

    /// Maximum time a single conversion may take
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one conversion
    pub fn arguments(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        // Keep ffmpeg quiet unless we are debugging
        if !tracing::enabled!(tracing::Level::DEBUG) {
            args.extend(["-loglevel", "error"].map(OsString::from));
        }

        args.extend(["-y", "-i"].map(OsString::from));
        args.push(source.as_os_str().to_owned());
        args.extend(["-vn", "-codec:a", "libmp3lame", "-q:a"].map(OsString::from));
        args.push(OsString::from(self.quality.to_string()));
        args.push(destination.as_os_str().to_owned());
        args
    }

    async fn run(&self, source: &Path, destination: &Path) -> Result<()> {
        debug!(
            "Encoding {} -> {} (quality {})",
            source.display(),
            destination.display(),
            self.quality
        );

        let child = Command::new(&self.program)
            .args(self.arguments(source, destination))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SyncError::EncoderLaunch {
                program: self.program.clone(),
                source: e,
            })?;

        let start_time = std::time::Instant::now();
        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| SyncError::EncoderTimeout {
                    source_path: source.to_path_buf(),
                    timeout,
                })?,
            None => wait.await,
        }
        .map_err(|e| SyncError::io(source, e))?;

        if !output.status.success() {
            return Err(SyncError::EncoderFailed {
                source_path: source.to_path_buf(),
                status: output.status,
                stderr: stderr_tail(&output.stderr),
            });
        }

        debug!(
            "Encoded {} in {:.1}s",
            source.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

impl Encoder for FfmpegEncoder {
    fn encode<'a>(&'a self, source: &'a Path, destination: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.run(source, destination))
    }

    fn check_available(&self) -> Result<()> {
        let resolved = which::which(&self.program).map_err(|e| SyncError::EncoderLaunch {
            program: self.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
        })?;
        debug!("Using encoder {}", resolved.display());
        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_arguments_layout() {
        let encoder = FfmpegEncoder::new(PathBuf::from("ffmpeg"), 2);
        let args = encoder.arguments(Path::new("in/a.flac"), Path::new("out/a.mp3"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        let tail = &args[args.len() - 9..];
        assert_eq!(
            tail,
            ["-y", "-i", "in/a.flac", "-vn", "-codec:a", "libmp3lame", "-q:a", "2", "out/a.mp3"]
        );
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let encoder = FfmpegEncoder::new(dir.path().join("no-such-ffmpeg"), 2);
        assert!(matches!(
            encoder.check_available(),
            Err(SyncError::EncoderLaunch { .. })
        ));

        let bare = FfmpegEncoder::new(PathBuf::from("no_such_encoder_xyz_12345"), 2);
        assert!(bare.check_available().is_err());
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let dir = TempDir::new().unwrap();
        let encoder = FfmpegEncoder::new(dir.path().join("no-such-ffmpeg"), 2);
        let result = encoder
            .encode(&dir.path().join("a.flac"), &dir.path().join("a.mp3"))
            .await;
        assert!(matches!(result, Err(SyncError::EncoderLaunch { .. })));
    }

    #[cfg(unix)]
    mod fake_encoder {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for ffmpeg
        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// Copies the `-i` input to the last argument
        const COPY_BODY: &str = r#"while [ $# -gt 1 ]; do
  if [ "$1" = "-i" ]; then src="$2"; fi
  shift
done
cp "$src" "$1""#;

        #[tokio::test]
        async fn test_successful_encode() {
            let dir = TempDir::new().unwrap();
            let program = script(dir.path(), COPY_BODY);
            let source = dir.path().join("a.flac");
            let destination = dir.path().join("a.mp3");
            std::fs::write(&source, b"pcm").unwrap();

            let encoder = FfmpegEncoder::new(program, 4);
            tokio_test::assert_ok!(encoder.encode(&source, &destination).await);
            assert_eq!(std::fs::read(&destination).unwrap(), b"pcm");
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_reported() {
            let dir = TempDir::new().unwrap();
            let program = script(dir.path(), "echo 'Invalid data found' >&2\nexit 1");

            let encoder = FfmpegEncoder::new(program, 4);
            let result = encoder
                .encode(&dir.path().join("a.flac"), &dir.path().join("a.mp3"))
                .await;

            match result {
                Err(SyncError::EncoderFailed { stderr, status, .. }) => {
                    assert!(!status.success());
                    assert!(stderr.contains("Invalid data found"));
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_timeout_fires() {
            let dir = TempDir::new().unwrap();
            let program = script(dir.path(), "sleep 10");

            let encoder = FfmpegEncoder::new(program, 4).with_timeout(Duration::from_millis(100));
            let result = encoder
                .encode(&dir.path().join("a.flac"), &dir.path().join("a.mp3"))
                .await;
            assert!(matches!(result, Err(SyncError::EncoderTimeout { .. })));
        }

        #[test]
        fn test_script_path_is_available() {
            let dir = TempDir::new().unwrap();
            let program = script(dir.path(), "exit 0");
            assert!(FfmpegEncoder::new(program, 4).check_available().is_ok());
        }

        #[test]
        fn test_non_executable_file_is_unavailable() {
            let dir = TempDir::new().unwrap();
            let program = script(dir.path(), "exit 0");
            std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o644)).unwrap();

            assert!(matches!(
                FfmpegEncoder::new(program, 4).check_available(),
                Err(SyncError::EncoderLaunch { .. })
            ));
        }
    }
}
