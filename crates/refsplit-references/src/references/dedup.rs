//! Word-level containment and the online dedup built on it.

use tracing::debug;

use super::changelog::ChangeLog;

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when every word of `needle` occurs as a whole word in `haystack`.
///
/// `needle` is split on single non-word characters, so adjacent or leading
/// separators yield empty words; an empty word only matches at a position
/// with no word character on either side.
///
/// ```
/// use refsplit_references::references::dedup::contains;
///
/// assert!(contains("78-2005", "JHEP,2005,78"));
/// assert!(!contains("05,78", "JHEP,2005,78"));
/// ```
pub fn contains(needle: &str, haystack: &str) -> bool {
    needle
        .split(|c: char| !is_word_char(c))
        .all(|word| contains_word(haystack, word))
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

/// Collapse `values` so that no survivor is contained in another.
///
/// Single pass in input order: a value already covered by a survivor is
/// dropped; a value covering survivors replaces them and goes to the back;
/// anything else is appended.
pub fn remove_duplicates(values: Vec<String>, log: &mut ChangeLog) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());

    for value in values {
        if unique.iter().any(|kept| value == *kept || contains(&value, kept)) {
            debug!(value = %value, "dropping contained value");
            log.push(format!("delete \"{value}\" - already in {unique:?}"));
            continue;
        }

        let (covered, kept): (Vec<String>, Vec<String>) =
            unique.into_iter().partition(|kept| contains(kept, &value));
        unique = kept;
        unique.push(value);
        for shorter in covered {
            debug!(value = %shorter, "replacing value by a longer one");
            log.push(format!("delete \"{shorter}\" - already in {unique:?}"));
        }
    }

    unique
}
