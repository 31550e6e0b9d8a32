use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    config::MATCH_ALL,
    error::{GatherError, Result},
    pattern::{WildcardPattern, has_wildcard},
};

/// What a single path specification resolves to.
#[derive(Debug, Clone)]
pub enum Target {
    /// An existing file.
    File(PathBuf),
    /// A directory walk matching file names against `pattern`.
    Walk { dir: PathBuf, pattern: WildcardPattern },
}

impl Target {
    /// Classify `spec` as an existing file, an existing directory (matched
    /// with `*`), or a wildcard file name under an existing directory.
    pub fn resolve(spec: &Path) -> Result<Target> {
        if spec.as_os_str().is_empty() {
            return Err(GatherError::invalid_argument("path specification is empty"));
        }

        // Sockets, fifos and devices count as files; the attribute filter
        // decides whether they are kept.
        if let Ok(meta) = fs::metadata(spec) {
            if meta.is_dir() {
                debug!("[target] {:?} is a directory", spec);
                return Ok(Target::Walk {
                    dir: spec.to_path_buf(),
                    pattern: WildcardPattern::new(MATCH_ALL)?,
                });
            }
            debug!("[target] {:?} is a file", spec);
            return Ok(Target::File(spec.to_path_buf()));
        }

        let Some(name) = spec.file_name().and_then(|n| n.to_str()) else {
            return Err(not_found(spec));
        };
        let dir = match spec.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if has_wildcard(name) && dir.is_dir() {
            debug!("[target] {:?} is pattern {:?} under {:?}", spec, name, dir);
            return Ok(Target::Walk {
                pattern: WildcardPattern::new(name)?,
                dir,
            });
        }

        Err(not_found(spec))
    }
}

fn not_found(spec: &Path) -> GatherError {
    GatherError::NotFound {
        path: spec.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
