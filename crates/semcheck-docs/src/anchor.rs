use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase `text`, collapse every run of characters outside `[a-z0-9]`
/// into a single `-` and trim leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Hands out document-unique anchors in document order.
///
/// The first occurrence of a base keeps it; later ones get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct AnchorAllocator {
    used: HashSet<String>,
}

impl AnchorAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn slug_examples() {
        assert_eq!(
            slugify("Title with Special & Characters!"),
            "title-with-special-characters"
        );
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("Multiple---Dashes"), "multiple-dashes");
        assert_eq!(slugify("  15.3. Client Error 4xx "), "15-3-client-error-4xx");
    }

    #[test]
    fn allocator_suffixes_in_order() {
        let mut alloc = AnchorAllocator::new();
        assert_eq!(alloc.allocate("test-section"), "test-section");
        assert_eq!(alloc.allocate("test-section"), "test-section-2");
        assert_eq!(alloc.allocate("test-section"), "test-section-3");
        assert_eq!(alloc.allocate("other"), "other");
    }

    #[test]
    fn allocator_skips_taken_suffix() {
        let mut alloc = AnchorAllocator::new();
        assert_eq!(alloc.allocate("a-2"), "a-2");
        assert_eq!(alloc.allocate("a"), "a");
        assert_eq!(alloc.allocate("a"), "a-3");
    }

    proptest! {
        #[test]
        fn slug_is_normalized(s in ".{0,64}") {
            let slug = slugify(&s);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slug_is_idempotent(s in ".{0,64}") {
            let once = slugify(&s);
            prop_assert_eq!(slugify(&once), once.clone());
        }
    }
}
