use std::{
    cmp::Ordering,
    fs::{self, DirEntry, read_dir},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use hashbrown::HashMap;
use ignore::WalkBuilder;
use log::{debug, warn};

use crate::{attributes::FileAttributes, pattern::WildcardPattern};

/// Settings the walk needs from the collector configuration.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub recurse: bool,
    pub ignore_directory_attributes: bool,
    pub prohibited: FileAttributes,
}

impl WalkOptions {
    /// A single native recursive enumeration is enough when no directory
    /// could be pruned by its attributes.
    #[inline]
    fn recurse_natively(&self) -> bool {
        self.recurse && (self.ignore_directory_attributes || self.prohibited.is_empty())
    }
}

/// A non-directory found by the walk, before acceptance.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Path as discovered (not canonical)
    pub path: PathBuf,
    pub attributes: FileAttributes,
}

impl Candidate {
    /// Inspect a single path. Links are not followed for the attributes,
    /// so a link to a file carries `REPARSE_POINT`.
    pub fn inspect(path: &Path) -> io::Result<Candidate> {
        let link_meta = fs::symlink_metadata(path)?;
        Ok(Candidate {
            attributes: FileAttributes::from_metadata(path, &link_meta),
            path: path.to_path_buf(),
        })
    }
}

/// Walk `dir`, handing every non-directory whose name matches `pattern` to
/// `visit`. Unreadable directories and entries are logged and skipped.
pub fn walk(
    dir: &Path,
    pattern: &WildcardPattern,
    opts: WalkOptions,
    visit: &mut dyn FnMut(Candidate),
) {
    if !opts.ignore_directory_attributes {
        match Candidate::inspect(dir) {
            Ok(c) if !opts.prohibited.allows(c.attributes) => {
                debug!(
                    "[walk] skipping {:?}: attributes {:?} are prohibited",
                    dir, c.attributes
                );
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("[walk] metadata({:?}) failed: {e}", dir);
                return;
            }
        }
    }

    if opts.recurse_natively() {
        debug!("[walk] recursive enumeration of {:?}", dir);
        scan_tree(dir, pattern, visit);
        return;
    }

    let subdirs = scan_dir(dir, pattern, visit);
    if opts.recurse {
        for sub in subdirs {
            walk(&sub, pattern, opts, visit);
        }
    }
}

/// Single-level enumeration. Returns the subdirectories, sorted by name.
fn scan_dir(
    dir: &Path,
    pattern: &WildcardPattern,
    visit: &mut dyn FnMut(Candidate),
) -> Vec<PathBuf> {
    let rd = match read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("[walk] read_dir({:?}) failed: {e}", dir);
            return Vec::new();
        }
    };

    let mut entries: Vec<DirEntry> = rd
        .filter_map(|res| match res {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("[walk] error reading entry in {:?}: {e}", dir);
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        let link_meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!("[walk] metadata({:?}) failed: {e}", path);
                continue;
            }
        };

        if link_meta.is_dir() {
            subdirs.push(path);
            continue;
        }
        if !is_match(&path, pattern) || !is_file_like(&path, &link_meta) {
            continue;
        }

        visit(Candidate {
            attributes: FileAttributes::from_metadata(&path, &link_meta),
            path,
        });
    }

    subdirs
}

/// Full recursive enumeration in one pass, in the same order `scan_dir`
/// followed by descent would produce.
fn scan_tree(dir: &Path, pattern: &WildcardPattern, visit: &mut dyn FnMut(Candidate)) {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_path({
            let kinds = DirKindCache::default();
            move |a, b| kinds.files_first(a, b)
        })
        .build();

    for res in walker {
        let entry = match res {
            Ok(e) => e,
            Err(e) => {
                warn!("[walk] error walking {:?}: {e}", dir);
                continue;
            }
        };
        if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let path = entry.path();
        if !is_match(path, pattern) {
            continue;
        }
        let link_meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!("[walk] metadata({:?}) failed: {e}", path);
                continue;
            }
        };
        if !is_file_like(path, &link_meta) {
            continue;
        }

        visit(Candidate {
            attributes: FileAttributes::from_metadata(path, &link_meta),
            path: path.to_path_buf(),
        });
    }
}

/// Remembers whether each path is a real (unlinked) directory, so sorting a
/// directory costs one `symlink_metadata` per entry, not per comparison.
#[derive(Default)]
struct DirKindCache {
    kinds: Mutex<HashMap<PathBuf, bool>>,
}

impl DirKindCache {
    fn files_first(&self, a: &Path, b: &Path) -> Ordering {
        self.is_real_dir(a)
            .cmp(&self.is_real_dir(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    }

    fn is_real_dir(&self, path: &Path) -> bool {
        let mut kinds = match self.kinds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(&is_dir) = kinds.get(path) {
            return is_dir;
        }
        let is_dir = fs::symlink_metadata(path).is_ok_and(|m| m.is_dir());
        kinds.insert(path.to_path_buf(), is_dir);
        is_dir
    }
}

fn is_match(path: &Path, pattern: &WildcardPattern) -> bool {
    path.file_name()
        .is_some_and(|n| pattern.matches(&n.to_string_lossy()))
}

/// Links are never descended; a link only counts when it resolves to
/// something other than a directory.
fn is_file_like(path: &Path, link_meta: &fs::Metadata) -> bool {
    if !link_meta.file_type().is_symlink() {
        return true;
    }
    match fs::metadata(path) {
        Ok(target) => !target.is_dir(),
        Err(e) => {
            debug!("[walk] skipping dangling link {:?}: {e}", path);
            false
        }
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
