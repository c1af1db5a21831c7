//! Pattern validation and splitting
//!
//! Include patterns are relative paths with `/` separators where a segment
//! may contain the wildcards `*` and `?`, or be the recursive marker `**`.
//! Validation rejects anything outside that dialect before the engine does
//! any filesystem work.

use crate::error::{GlobError, PatternError};

/// The recursive marker segment
pub const RECURSIVE_SEGMENT: &str = "**";

/// Returns whether `segment` is the recursive marker `**`
pub fn is_recursive(segment: &str) -> bool {
    segment == RECURSIVE_SEGMENT
}

/// Check a single pattern for validity.
///
/// Rejected: empty patterns, absolute patterns, empty segments, `.` or `..`
/// segments, and `**` mixed with other characters in a segment.
pub fn validate(pattern: &str) -> std::result::Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.starts_with('/') {
        return Err(PatternError::Absolute);
    }
    for segment in pattern.split('/') {
        if segment.is_empty() {
            return Err(PatternError::EmptySegment);
        }
        if segment == "." || segment == ".." {
            return Err(PatternError::DotSegment(segment.to_string()));
        }
        if segment.contains(RECURSIVE_SEGMENT) && !is_recursive(segment) {
            return Err(PatternError::MixedRecursive);
        }
    }
    Ok(())
}

/// Split a pattern into its ordered segments.
///
/// Callers must have validated the pattern first; splitting does not check
/// for empty segments.
pub fn split(pattern: &str) -> Vec<String> {
    pattern.split('/').map(str::to_string).collect()
}

/// Validate every pattern and split each into segments.
///
/// The whole batch is rejected on the first invalid pattern, so a query
/// never starts traversal with a partially valid pattern set.
pub fn check_and_split<I, S>(patterns: I) -> crate::error::Result<Vec<Vec<String>>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut split_patterns = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        validate(pattern).map_err(|source| GlobError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        split_patterns.push(split(pattern));
    }
    Ok(split_patterns)
}
