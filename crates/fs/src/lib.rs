mod attributes;
mod collector;
mod config;
mod entry;
mod error;
mod pattern;
mod set;
mod target;
mod walker;

pub use attributes::FileAttributes;
pub use collector::{Collector, CollectorConfig, FileFoundEvent};
pub use config::{MATCH_ALL, WILDCARD_CHARS};
pub use entry::{CollectedEntry, path_key};
pub use error::{GatherError, Result};
pub use pattern::{WildcardPattern, has_wildcard};
pub use set::EntrySet;
pub use target::Target;
