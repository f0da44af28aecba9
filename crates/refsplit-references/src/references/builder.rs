use std::fmt::Write as _;

use refsplit_core::{DataField, Subfield};

use super::consolidate::SplitPart;
use super::parser::{ADDITIONAL_PUBNOTE_PREFIX, NOTE_SEPARATOR, PartKind};

/// Provenance marker that curators put in `$$9`; never copied to split outputs.
const CURATOR_MARKER: &str = "CURATOR";

/// Subfields copied onto every output of a split reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonPart {
    /// Everything except `a`, `r`, `s`, `0`, `y` and curator markers.
    pub rest: Vec<Subfield>,
    /// The original `y` subfields, used by outputs without a year of their own.
    pub years: Vec<Subfield>,
}

/// Collect the subfields of `original` that every split output shares.
///
/// Notes lose their `Additional pubnote:` sub-notes, since those pubnotes
/// are distributed to the outputs they resolved to.
pub fn common_part(subfields: &[Subfield]) -> CommonPart {
    let mut common = CommonPart::default();

    for subfield in subfields {
        match subfield.code {
            'a' | 'r' | 's' | '0' => {}
            '9' if subfield.value.eq_ignore_ascii_case(CURATOR_MARKER) => {}
            'y' => common.years.push(subfield.clone()),
            'm' => {
                let kept: Vec<&str> = subfield
                    .value
                    .split(NOTE_SEPARATOR)
                    .filter(|sub_note| !sub_note.starts_with(ADDITIONAL_PUBNOTE_PREFIX))
                    .collect();
                if !kept.is_empty() {
                    common
                        .rest
                        .push(Subfield::new('m', kept.join(NOTE_SEPARATOR)));
                }
            }
            _ => common.rest.push(subfield.clone()),
        }
    }

    common
}

/// Output fields for one split reference plus the audit text describing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltFields {
    pub fields: Vec<DataField>,
    pub log: String,
}

impl BuiltFields {
    pub fn count(&self) -> usize {
        self.fields.len()
    }
}

/// Turn split parts into reference fields carrying `original`'s tag and
/// indicators.
///
/// Each output holds its own parts, then the common part, then the original
/// years unless the part brought a year, then `provenance_note` as a final `m`.
pub fn build_split_fields(
    original: &DataField,
    parts: &[SplitPart],
    provenance_note: &str,
) -> BuiltFields {
    let common = common_part(&original.subfields);

    let mut log = format!("\n  {}\n", render(&original.subfields));
    let shared: Vec<Subfield> = common.rest.iter().chain(&common.years).cloned().collect();
    let _ = writeln!(log, "= {}", render(&shared));

    let mut fields = Vec::with_capacity(parts.len());
    for part in parts {
        if part.subfields.is_empty() {
            continue;
        }
        let _ = writeln!(log, "+ {}", render(&part.subfields));

        let has_own_year = part
            .subfields
            .iter()
            .any(|sf| sf.code == PartKind::Year.code());
        let mut subfields = part.subfields.clone();
        subfields.extend(common.rest.iter().cloned());
        if !has_own_year {
            subfields.extend(common.years.iter().cloned());
        }
        subfields.push(Subfield::new(PartKind::Note.code(), provenance_note));

        fields.push(DataField::new(
            original.tag.clone(),
            original.ind1,
            original.ind2,
            subfields,
        ));
    }

    BuiltFields { fields, log }
}

fn render(subfields: &[Subfield]) -> String {
    subfields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
