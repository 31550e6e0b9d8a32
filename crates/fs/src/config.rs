/// Characters that make a file-name fragment a wildcard pattern.
pub const WILDCARD_CHARS: [char; 2] = ['?', '*'];

/// Match pattern used when a whole directory is named.
pub const MATCH_ALL: &str = "*";
