use std::collections::BTreeSet;

use regex::Regex;

use crate::error::ReduceError;
use crate::window::{context_range, join_selected, split_lines};

/// Keep every line matching `pattern` plus `before`/`after` lines of context,
/// in document order. Overlapping windows merge.
///
/// # Errors
///
/// Returns [`ReduceError::RegexCompileFailed`] for an invalid pattern and
/// [`ReduceError::NoRegexMatches`] if no line matches.
pub fn execute_grep(
    content: &str,
    pattern: &str,
    before: usize,
    after: usize,
) -> Result<String, ReduceError> {
    let re = Regex::new(pattern).map_err(|e| ReduceError::RegexCompileFailed {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let lines = split_lines(content);
    let mut kept = BTreeSet::new();
    let mut matches = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if re.is_match(line) {
            matches += 1;
            kept.extend(context_range(i, before, after, lines.len()));
        }
    }

    if matches == 0 {
        return Err(ReduceError::NoRegexMatches {
            pattern: pattern.to_string(),
        });
    }

    tracing::debug!(pattern, matches, kept = kept.len(), "grep reduction");
    Ok(join_selected(&lines, &kept))
}
