use std::collections::BTreeMap;
use std::fmt;

use refsplit_core::Subfield;

/// Separator between sub-notes packed into one `m` value.
pub const NOTE_SEPARATOR: &str = " / ";
/// Sub-note prefix marking a pubnote that was demoted into the note field.
pub const ADDITIONAL_PUBNOTE_PREFIX: &str = "Additional pubnote: ";

/// The reference part categories the splitter reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    /// `a`: free-text citation
    Citation,
    /// `r`: report number
    ReportNumber,
    /// `s`: journal pubnote
    Pubnote,
    /// `m`: note, and the catch-all for garbage
    Note,
    /// `y`: publication year
    Year,
}

impl PartKind {
    pub const fn code(self) -> char {
        match self {
            Self::Citation => 'a',
            Self::ReportNumber => 'r',
            Self::Pubnote => 's',
            Self::Note => 'm',
            Self::Year => 'y',
        }
    }
}

/// A reference field broken down by subfield code.
///
/// Categories `a`, `r` and `s` always exist (possibly empty); every other
/// code is carried through verbatim in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    parts: BTreeMap<char, Vec<String>>,
}

impl Default for Reference {
    fn default() -> Self {
        Self::new()
    }
}

impl Reference {
    pub fn new() -> Self {
        let mut parts = BTreeMap::new();
        for kind in [PartKind::Citation, PartKind::ReportNumber, PartKind::Pubnote] {
            parts.insert(kind.code(), Vec::new());
        }
        Self { parts }
    }

    pub fn values(&self, code: char) -> &[String] {
        self.parts.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn part(&self, kind: PartKind) -> &[String] {
        self.values(kind.code())
    }

    pub fn part_mut(&mut self, kind: PartKind) -> &mut Vec<String> {
        self.parts.entry(kind.code()).or_default()
    }

    pub fn push(&mut self, code: char, value: impl Into<String>) {
        self.parts.entry(code).or_default().push(value.into());
    }

    pub fn citations(&self) -> &[String] {
        self.part(PartKind::Citation)
    }

    pub fn report_numbers(&self) -> &[String] {
        self.part(PartKind::ReportNumber)
    }

    pub fn pubnotes(&self) -> &[String] {
        self.part(PartKind::Pubnote)
    }

    pub fn notes(&self) -> &[String] {
        self.part(PartKind::Note)
    }

    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.parts.keys().copied()
    }

    /// Flatten back to subfields, grouped by code in code order.
    pub fn to_subfields(&self) -> Vec<Subfield> {
        self.parts
            .iter()
            .flat_map(|(code, values)| values.iter().map(|value| Subfield::new(*code, value.clone())))
            .collect()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for subfield in self.to_subfields() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{subfield}")?;
            first = false;
        }
        Ok(())
    }
}

/// Build a [`Reference`] from the raw subfields of one reference field.
///
/// Each `m` value is split on [`NOTE_SEPARATOR`]; sub-notes carrying
/// [`ADDITIONAL_PUBNOTE_PREFIX`] become pubnotes, the others stay together
/// as one `m` value. No deduplication happens here.
pub fn parse_reference(subfields: &[Subfield]) -> Reference {
    let mut reference = Reference::new();

    for subfield in subfields {
        if subfield.code != PartKind::Note.code() {
            reference.push(subfield.code, subfield.value.clone());
            continue;
        }

        let mut remaining = Vec::new();
        for sub_note in subfield.value.split(NOTE_SEPARATOR) {
            match sub_note.strip_prefix(ADDITIONAL_PUBNOTE_PREFIX) {
                Some(pubnote) => reference.push(PartKind::Pubnote.code(), pubnote),
                None => remaining.push(sub_note),
            }
        }
        if !remaining.is_empty() {
            reference.push(PartKind::Note.code(), remaining.join(NOTE_SEPARATOR));
        }
    }

    reference
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf(code: char, value: &str) -> Subfield {
        Subfield::new(code, value)
    }

    #[test]
    fn core_categories_always_present() {
        let reference = parse_reference(&[sf('o', "12")]);
        assert!(reference.citations().is_empty());
        assert!(reference.report_numbers().is_empty());
        assert!(reference.pubnotes().is_empty());
        assert_eq!(reference.codes().collect::<Vec<_>>(), vec!['a', 'o', 'r', 's']);
        assert_eq!(reference.values('o'), ["12".to_string()]);
    }

    #[test]
    fn keeps_input_order_and_duplicates() {
        let reference = parse_reference(&[
            sf('s', "JHEP,0505,078"),
            sf('r', "hep-th/0501001"),
            sf('s', "Phys.Rev.,D70,1"),
            sf('s', "JHEP,0505,078"),
        ]);
        assert_eq!(
            reference.pubnotes(),
            ["JHEP,0505,078", "Phys.Rev.,D70,1", "JHEP,0505,078"]
        );
        assert_eq!(reference.report_numbers(), ["hep-th/0501001"]);
    }

    #[test]
    fn additional_pubnotes_move_to_s() {
        let reference = parse_reference(&[
            sf('s', "JHEP,0505,078"),
            sf('m', "Additional pubnote: Phys.Rev.,D70,1 / erratum / Additional pubnote: Nucl.Phys.,B1,2"),
        ]);
        assert_eq!(
            reference.pubnotes(),
            ["JHEP,0505,078", "Phys.Rev.,D70,1", "Nucl.Phys.,B1,2"]
        );
        assert_eq!(reference.notes(), ["erratum"]);
    }

    #[test]
    fn plain_notes_are_rejoined() {
        let reference = parse_reference(&[sf('m', "first / second")]);
        assert_eq!(reference.notes(), ["first / second"]);
    }

    #[test]
    fn note_made_only_of_pubnotes_leaves_no_m() {
        let reference = parse_reference(&[sf('m', "Additional pubnote: JHEP,0505,078")]);
        assert!(reference.notes().is_empty());
        assert_eq!(reference.pubnotes(), ["JHEP,0505,078"]);
    }
}
