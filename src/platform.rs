//! # Platform-specific utilities
//!
//! Questo modulo centralizza la lettura degli attributi dei file che
//! escludono un'entry dalla sincronizzazione (hidden, read-only, system).
//! Su Windows vengono letti gli attributi nativi, sui sistemi Unix-like
//! vengono derivati dal nome e dai permessi.

use std::fs::Metadata;
use std::path::Path;

/// Attributes of a filesystem entry relevant to the sync filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    pub hidden: bool,
    pub read_only: bool,
    pub system: bool,
}

impl EntryAttributes {
    /// Read the attributes of `path` from its already fetched metadata.
    /// Only the entry itself is inspected, never its ancestors.
    pub fn of(path: &Path, metadata: &Metadata) -> Self {
        Self::from_platform(path, metadata)
    }

    /// True if none of hidden / read-only / system is set
    pub fn is_plain(&self) -> bool {
        !(self.hidden || self.read_only || self.system)
    }

    #[cfg(windows)]
    fn from_platform(_path: &Path, metadata: &Metadata) -> Self {
        use std::os::windows::fs::MetadataExt;

        const FILE_ATTRIBUTE_READONLY: u32 = 0x1;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

        let attributes = metadata.file_attributes();
        Self {
            hidden: attributes & FILE_ATTRIBUTE_HIDDEN != 0,
            read_only: attributes & FILE_ATTRIBUTE_READONLY != 0,
            system: attributes & FILE_ATTRIBUTE_SYSTEM != 0,
        }
    }

    #[cfg(not(windows))]
    fn from_platform(path: &Path, metadata: &Metadata) -> Self {
        let hidden = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with('.'))
            .unwrap_or(false);

        Self {
            hidden,
            read_only: metadata.permissions().readonly(),
            system: false,
        }
    }
}
