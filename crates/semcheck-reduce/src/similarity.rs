use std::collections::BTreeSet;

use crate::window::{char_len, context_range, join_selected};

/// Cosine similarity of two vectors; `0.0` when their lengths differ or either
/// has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Line indices ordered by descending score. Ties keep document order.
#[must_use]
pub fn rank(scores: &[(usize, f32)]) -> Vec<usize> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().map(|(idx, _)| idx).collect()
}

/// Expand ranked lines into context windows until the selected text reaches
/// `budget` characters, then emit the selection in document order.
///
/// Each newly selected line counts its length plus one for the newline. The
/// budget is only checked between windows, so the last window is kept whole.
#[must_use]
pub fn select_ranked(
    lines: &[&str],
    ranked: &[usize],
    budget: usize,
    before: usize,
    after: usize,
) -> String {
    let mut selected = BTreeSet::new();
    let mut total = 0usize;

    for &idx in ranked {
        if idx >= lines.len() {
            continue;
        }
        for i in context_range(idx, before, after, lines.len()) {
            if selected.insert(i) {
                total += char_len(lines[i]) + 1;
            }
        }
        if total >= budget {
            break;
        }
    }

    join_selected(lines, &selected)
}
