//! # Path Resolution Module
//!
//! Centralizza la conversione tra path relativi, identità dei file
//! (path relativo senza estensione) e path assoluti nei due alberi.

use std::path::{Path, PathBuf};

/// Utility per calcolare identità e path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Identity of a relative file path carrying `extension`, i.e. the path
    /// with that suffix removed. `None` when the name does not end with the
    /// extension, when nothing is left once it is stripped, or when the
    /// name is not valid UTF-8.
    pub fn identity(relative: &Path, extension: &str) -> Option<PathBuf> {
        let file_name = relative.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(extension)?;
        if stem.is_empty() {
            return None;
        }
        Some(relative.with_file_name(stem))
    }

    /// `<root>/<identity><extension>`
    pub fn resolve(root: &Path, identity: &Path, extension: &str) -> PathBuf {
        let mut path = root.join(identity).into_os_string();
        path.push(extension);
        PathBuf::from(path)
    }
}
