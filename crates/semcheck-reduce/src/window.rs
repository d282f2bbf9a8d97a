use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Lines `[idx - before, idx + after]`, clamped to the document. `len` must be
/// non-zero.
pub(crate) fn context_range(
    idx: usize,
    before: usize,
    after: usize,
    len: usize,
) -> RangeInclusive<usize> {
    idx.saturating_sub(before)..=idx.saturating_add(after).min(len - 1)
}

/// Selected lines in document order.
pub(crate) fn join_selected(lines: &[&str], selected: &BTreeSet<usize>) -> String {
    selected
        .iter()
        .map(|&i| lines[i])
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Longest prefix of `s` holding at most `max` characters.
pub(crate) fn char_prefix(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(i, _)| &s[..i])
}
