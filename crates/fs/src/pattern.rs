use globset::{GlobBuilder, GlobMatcher};

use crate::{
    config::{MATCH_ALL, WILDCARD_CHARS},
    error::{GatherError, Result},
};

/// Whether a file-name fragment contains `?` or `*`.
#[inline]
pub fn has_wildcard(fragment: &str) -> bool {
    fragment.contains(WILDCARD_CHARS)
}

/// Case-insensitive file-name matcher supporting only `?` and `*`.
/// Every other glob metacharacter is taken literally.
#[derive(Debug, Clone)]
pub enum WildcardPattern {
    Any,
    Glob { source: String, matcher: GlobMatcher },
}

impl WildcardPattern {
    pub fn new(fragment: &str) -> Result<Self> {
        if fragment == MATCH_ALL {
            return Ok(WildcardPattern::Any);
        }

        let matcher = GlobBuilder::new(&escape_literals(fragment))
            .case_insensitive(true)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| GatherError::Pattern {
                pattern: fragment.to_owned(),
                source,
            })?
            .compile_matcher();

        Ok(WildcardPattern::Glob {
            source: fragment.to_owned(),
            matcher,
        })
    }

    #[inline]
    pub fn any() -> Self {
        WildcardPattern::Any
    }

    /// Match a bare file name (no directory part).
    pub fn matches(&self, name: &str) -> bool {
        match self {
            WildcardPattern::Any => true,
            WildcardPattern::Glob { matcher, .. } => matcher.is_match(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WildcardPattern::Any => MATCH_ALL,
            WildcardPattern::Glob { source, .. } => source,
        }
    }
}

fn escape_literals(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '[' | ']' | '{' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
