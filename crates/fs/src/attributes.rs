use std::{fs::Metadata, path::Path};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Filesystem attribute flags, decoupled from any host representation.
    /// Bit values follow the conventional attribute word so a host word can
    /// be truncated straight into this set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FileAttributes: u32 {
        const READONLY            = 0x0000_0001;
        const HIDDEN              = 0x0000_0002;
        /// Owned by the OS; on unix, special nodes (socket, fifo, device).
        const SYSTEM              = 0x0000_0004;
        const DIRECTORY           = 0x0000_0010;
        const ARCHIVE             = 0x0000_0020;
        const DEVICE              = 0x0000_0040;
        /// No other attribute applies.
        const NORMAL              = 0x0000_0080;
        const TEMPORARY           = 0x0000_0100;
        const SPARSE_FILE         = 0x0000_0200;
        /// Symbolic link or other reparse point.
        const REPARSE_POINT       = 0x0000_0400;
        const COMPRESSED          = 0x0000_0800;
        /// Content lives in remote storage. Never reported on unix.
        const OFFLINE             = 0x0000_1000;
        const NOT_CONTENT_INDEXED = 0x0000_2000;
        const ENCRYPTED           = 0x0000_4000;
    }
}

impl FileAttributes {
    /// Attributes excluded unless the caller says otherwise.
    pub const DEFAULT_PROHIBITED: FileAttributes = FileAttributes::HIDDEN
        .union(FileAttributes::OFFLINE)
        .union(FileAttributes::SYSTEM);

    /// Treating `self` as a prohibited mask, whether an item carrying
    /// `item` passes: it must not carry any of the prohibited flags.
    #[inline]
    #[must_use]
    pub fn allows(self, item: FileAttributes) -> bool {
        (self & item).is_empty()
    }

    /// Translate host metadata for `path` into a flag set.
    ///
    /// `metadata` should come from `symlink_metadata` when the caller wants
    /// links reported as `REPARSE_POINT`.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> FileAttributes {
        let attrs = host_attributes(path, metadata);
        if attrs.is_empty() {
            FileAttributes::NORMAL
        } else {
            attrs
        }
    }
}

#[cfg(windows)]
fn host_attributes(_path: &Path, metadata: &Metadata) -> FileAttributes {
    use std::os::windows::fs::MetadataExt;

    FileAttributes::from_bits_truncate(metadata.file_attributes())
}

#[cfg(not(windows))]
fn host_attributes(path: &Path, metadata: &Metadata) -> FileAttributes {
    let mut attrs = FileAttributes::empty();
    let file_type = metadata.file_type();

    if is_dot_hidden(path) {
        attrs |= FileAttributes::HIDDEN;
    }
    if file_type.is_dir() {
        attrs |= FileAttributes::DIRECTORY;
    }
    if file_type.is_symlink() {
        attrs |= FileAttributes::REPARSE_POINT;
    }
    if metadata.permissions().readonly() {
        attrs |= FileAttributes::READONLY;
    }
    if is_special(metadata) {
        attrs |= FileAttributes::SYSTEM | FileAttributes::DEVICE;
    }

    attrs
}

#[cfg(not(windows))]
fn is_dot_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.as_encoded_bytes())
        .is_some_and(|n| n.first() == Some(&b'.') && n != b"." && n != b"..")
}

#[cfg(unix)]
fn is_special(metadata: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;

    let ft = metadata.file_type();
    ft.is_socket() || ft.is_fifo() || ft.is_block_device() || ft.is_char_device()
}

#[cfg(not(any(unix, windows)))]
fn is_special(metadata: &Metadata) -> bool {
    let ft = metadata.file_type();
    !ft.is_file() && !ft.is_dir() && !ft.is_symlink()
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
