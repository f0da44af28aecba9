use refsplit_core::Subfield;

use super::changelog::ChangeLog;
use super::dedup::remove_duplicates;
use super::garbage::remove_garbage;
use super::parser::{PartKind, Reference, parse_reference};

/// Dedup pubnotes, then report numbers, then move garbage pubnotes to `m`.
pub fn clean(mut reference: Reference) -> (Reference, ChangeLog) {
    let mut log = ChangeLog::new();

    for kind in [PartKind::Pubnote, PartKind::ReportNumber] {
        let values = std::mem::take(reference.part_mut(kind));
        *reference.part_mut(kind) = remove_duplicates(values, &mut log);
    }
    remove_garbage(&mut reference, &mut log);

    (reference, log)
}

/// Parse and clean the raw subfields of one reference field.
pub fn clean_reference(subfields: &[Subfield]) -> (Reference, ChangeLog) {
    clean(parse_reference(subfields))
}
