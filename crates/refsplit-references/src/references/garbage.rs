use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::changelog::ChangeLog;
use super::parser::{PartKind, Reference};

static NO_LETTERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^A-Za-z]+$").expect("valid no-letters regex"));

/// Leftover numbers and punctuation that cannot be a journal pubnote.
pub fn is_garbage(value: &str) -> bool {
    value.starts_with(',') || NO_LETTERS_RE.is_match(value)
}

/// Move garbage pubnotes from `s` to `m`, logging every move.
///
/// Each log entry shows `s` as it stands right after that move, so later
/// garbage values are still listed.
pub fn remove_garbage(reference: &mut Reference, log: &mut ChangeLog) {
    let pubnotes = reference.pubnotes().to_vec();
    for value in pubnotes.into_iter().filter(|value| is_garbage(value)) {
        let remaining = reference.part_mut(PartKind::Pubnote);
        if let Some(pos) = remaining.iter().position(|kept| *kept == value) {
            remaining.remove(pos);
        }
        debug!(value = %value, "moving garbage pubnote to note");
        log.push(format!(
            "s -> m \"{value}\" - remains {:?}",
            reference.pubnotes()
        ));
        reference.push(PartKind::Note.code(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_garbage() {
        assert!(is_garbage(",123"));
        assert!(is_garbage(",JHEP"));
        assert!(is_garbage("4567"));
        assert!(is_garbage("12-34 (5)"));
        assert!(!is_garbage("JHEP,2005,78"));
        assert!(!is_garbage(""));
    }

    #[test]
    fn moves_all_garbage_values() {
        let mut reference = Reference::new();
        for value in [",123", "4567", "JHEP,2005,78"] {
            reference.push('s', value);
        }
        reference.push('m', "erratum");

        let mut log = ChangeLog::new();
        remove_garbage(&mut reference, &mut log);

        assert_eq!(reference.pubnotes(), ["JHEP,2005,78"]);
        assert_eq!(reference.notes(), ["erratum", ",123", "4567"]);
        assert_eq!(
            log.to_string(),
            "s -> m \",123\" - remains [\"4567\", \"JHEP,2005,78\"]; s -> m \"4567\" - remains [\"JHEP,2005,78\"]; "
        );
    }

    #[test]
    fn repeated_garbage_is_moved_once_per_occurrence() {
        let mut reference = Reference::new();
        for value in ["12", "A,1,2", "12"] {
            reference.push('s', value);
        }

        let mut log = ChangeLog::new();
        remove_garbage(&mut reference, &mut log);

        assert_eq!(reference.pubnotes(), ["A,1,2"]);
        assert_eq!(reference.notes(), ["12", "12"]);
        assert_eq!(
            log.entries(),
            [
                "s -> m \"12\" - remains [\"A,1,2\", \"12\"]",
                "s -> m \"12\" - remains [\"A,1,2\"]",
            ]
        );
    }

    #[test]
    fn clean_reference_is_untouched() {
        let mut reference = Reference::new();
        reference.push('s', "Phys.Rev.,D70,1");
        let mut log = ChangeLog::new();
        remove_garbage(&mut reference, &mut log);
        assert!(log.is_empty());
        assert!(reference.notes().is_empty());
    }
}
