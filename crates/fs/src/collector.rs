use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    attributes::FileAttributes,
    entry::CollectedEntry,
    error::{GatherError, Result},
    set::EntrySet,
    target::Target,
    walker::{Candidate, WalkOptions, walk},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Descend into subdirectories
    pub recurse: bool,
    /// Skip per-directory attribute checks so the whole tree can be
    /// enumerated in one pass. Files are still filtered.
    pub ignore_directory_attributes: bool,
    /// Files and directories carrying any of these are excluded
    pub prohibited_attributes: FileAttributes,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            recurse: true,
            ignore_directory_attributes: false,
            prohibited_attributes: FileAttributes::DEFAULT_PROHIBITED,
        }
    }
}

impl CollectorConfig {
    fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recurse: self.recurse,
            ignore_directory_attributes: self.ignore_directory_attributes,
            prohibited: self.prohibited_attributes,
        }
    }
}

/// Handed to each file-found observer right before a file is added.
/// Setting `ignore` vetoes the file; later observers see the flag as left
/// by earlier ones.
#[derive(Debug)]
pub struct FileFoundEvent<'a> {
    pub entry: &'a CollectedEntry,
    pub ignore: bool,
}

type FileFoundObserver = Box<dyn FnMut(&mut FileFoundEvent<'_>)>;

/// Gathers files named by paths, directories or wildcard patterns into an
/// insertion-ordered set keyed by canonical path.
///
/// Single-owner and synchronous: every `add` blocks until its walk is done.
#[derive(Default)]
pub struct Collector {
    config: CollectorConfig,
    entries: EntrySet,
    observers: Vec<FileFoundObserver>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Collector {
            config,
            entries: EntrySet::new(),
            observers: Vec::new(),
        }
    }

    /// Build a collector and add every path specification in order.
    pub fn with_paths<I, P>(paths: I, config: CollectorConfig) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut collector = Collector::new(config);
        collector.add_all(paths)?;
        Ok(collector)
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Replace the configuration. Only later `add` calls are affected.
    pub fn set_config(&mut self, config: CollectorConfig) {
        self.config = config;
    }

    pub fn recurse(&self) -> bool {
        self.config.recurse
    }

    pub fn set_recurse(&mut self, recurse: bool) {
        self.config.recurse = recurse;
    }

    pub fn ignore_directory_attributes(&self) -> bool {
        self.config.ignore_directory_attributes
    }

    pub fn set_ignore_directory_attributes(&mut self, ignore: bool) {
        self.config.ignore_directory_attributes = ignore;
    }

    pub fn prohibited_attributes(&self) -> FileAttributes {
        self.config.prohibited_attributes
    }

    pub fn set_prohibited_attributes(&mut self, prohibited: FileAttributes) {
        self.config.prohibited_attributes = prohibited;
    }

    /// Register an observer run for every file about to be added.
    /// Observers run in registration order.
    pub fn on_file_found<F>(&mut self, observer: F)
    where
        F: FnMut(&mut FileFoundEvent<'_>) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Resolve one path specification and gather what it names.
    /// Returns how many entries this call added.
    pub fn add(&mut self, spec: impl AsRef<Path>) -> Result<usize> {
        let spec = spec.as_ref();
        let before = self.entries.len();

        match Target::resolve(spec)? {
            Target::File(path) => {
                self.add_file(&path)?;
            }
            Target::Walk { dir, pattern } => {
                let opts = self.config.walk_options();
                walk(&dir, &pattern, opts, &mut |candidate: Candidate| {
                    let path = candidate.path.clone();
                    if let Err(e) = self.accept(candidate) {
                        warn!("[collector] skipping {:?}: {e}", path);
                    }
                });
            }
        }

        let added = self.entries.len() - before;
        debug!("[collector] {:?} added {} file(s)", spec, added);
        Ok(added)
    }

    /// Add each specification in order, stopping at the first error.
    /// Entries added before the failure stay.
    pub fn add_all<I, P>(&mut self, specs: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for spec in specs {
            added += self.add(spec)?;
        }
        Ok(added)
    }

    /// Offer a single existing file for acceptance, bypassing
    /// classification. Returns whether it was added.
    pub fn add_file(&mut self, path: &Path) -> Result<bool> {
        let candidate = Candidate::inspect(path).map_err(|e| GatherError::io(path, e))?;
        self.accept(candidate).map_err(|e| GatherError::io(path, e))
    }

    fn accept(&mut self, candidate: Candidate) -> io::Result<bool> {
        if !self.config.prohibited_attributes.allows(candidate.attributes) {
            debug!(
                "[collector] rejecting {:?}: attributes {:?}",
                candidate.path, candidate.attributes
            );
            return Ok(false);
        }

        let path = fs::canonicalize(&candidate.path)?;
        if self.entries.contains(&path) {
            return Ok(false);
        }

        let meta = fs::metadata(&path)?;
        let entry = CollectedEntry::new(path, candidate.attributes, &meta);
        if self.notify(&entry) {
            debug!("[collector] observer ignored {:?}", entry.path);
            return Ok(false);
        }

        Ok(self.entries.insert(entry))
    }

    /// Run the observers; true when the file should be ignored.
    fn notify(&mut self, entry: &CollectedEntry) -> bool {
        let mut event = FileFoundEvent {
            entry,
            ignore: false,
        };
        for observer in &mut self.observers {
            observer(&mut event);
        }
        event.ignore
    }

    #[inline]
    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    pub fn into_entries(self) -> EntrySet {
        self.entries
    }

    /// Snapshot of the collected files in discovery order.
    pub fn to_vec(&self) -> Vec<CollectedEntry> {
        self.entries.to_vec()
    }

    /// Collected canonical paths in discovery order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectedEntry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keyed lookup; `path` must be canonical, case is ignored.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains(path)
    }

    pub fn get(&self, path: &Path) -> Option<&CollectedEntry> {
        self.entries.get(path)
    }
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collector {
    type Item = &'a CollectedEntry;
    type IntoIter = std::slice::Iter<'a, CollectedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
