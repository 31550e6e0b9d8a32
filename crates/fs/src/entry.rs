use std::{
    fs::Metadata,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::attributes::FileAttributes;

/// A file accepted (or about to be accepted) by the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedEntry {
    /// Canonical absolute path
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// Attributes captured when the file was discovered
    pub attributes: FileAttributes,
    /// File size
    pub len: u64,
    /// Last modified time in unix seconds, 0 when unavailable
    pub mtime_secs: u64,
}

impl CollectedEntry {
    /// Build an entry for an already-canonical path. `attributes` belong to
    /// the path as discovered, which differs from `path` for links.
    pub(crate) fn new(path: PathBuf, attributes: FileAttributes, meta: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        CollectedEntry {
            name,
            attributes,
            len: meta.len(),
            mtime_secs: to_unix_secs(meta.modified().ok()),
            path,
        }
    }

    /// Uniqueness key of this entry.
    #[inline]
    pub fn key(&self) -> Vec<u8> {
        path_key(&self.path)
    }
}

/// Case-insensitive key for a canonical path.
///
/// UTF-8 paths are lowercased in full. Other paths keep their raw bytes
/// with only ASCII folded, so names differing in invalid bytes stay distinct.
pub fn path_key(path: &Path) -> Vec<u8> {
    match path.to_str() {
        Some(s) => s.to_lowercase().into_bytes(),
        None => path.as_os_str().as_encoded_bytes().to_ascii_lowercase(),
    }
}

fn to_unix_secs(t: Option<SystemTime>) -> u64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
