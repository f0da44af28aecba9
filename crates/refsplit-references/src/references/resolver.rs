use std::fmt;

use refsplit_core::RecordId;
use tracing::debug;

use super::parser::Reference;
use crate::identifiers::normalize_report_number;
use crate::matcher::RecordMatcher;

/// Where a reference part points: one record, or nowhere in particular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchTarget {
    Record(RecordId),
    /// No record, or more than one with no way to choose.
    Unmatched,
}

impl MatchTarget {
    /// A result pins a part to a record only when it holds exactly one id.
    pub fn from_ids(ids: &[RecordId]) -> Self {
        match ids {
            [id] => Self::Record(*id),
            _ => Self::Unmatched,
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Self::Record(id) => Some(*id),
            Self::Unmatched => None,
        }
    }
}

impl fmt::Display for MatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(id) => write!(f, "{id}"),
            Self::Unmatched => f.write_str("NN"),
        }
    }
}

/// Values of one part category grouped by target, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    entries: Vec<(MatchTarget, Vec<String>)>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, target: MatchTarget, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == target) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((target, vec![value])),
        }
    }

    pub fn get(&self, target: MatchTarget) -> &[String] {
        self.entries
            .iter()
            .find(|(t, _)| *t == target)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn owns(&self, id: RecordId) -> bool {
        !self.get(MatchTarget::Record(id)).is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = MatchTarget> + '_ {
        self.entries.iter().map(|(target, _)| *target)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A pubnote that matched several records, held until clusters are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousMatch {
    pub value: String,
    pub candidates: Vec<RecordId>,
}

/// Per-category match sets for one reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub citations: MatchSet,
    pub report_numbers: MatchSet,
    pub pubnotes: MatchSet,
    pub ambiguous: Vec<AmbiguousMatch>,
}

impl Resolution {
    /// Whether any category already attributes a part to `id`.
    pub fn owns(&self, id: RecordId) -> bool {
        self.citations.owns(id) || self.report_numbers.owns(id) || self.pubnotes.owns(id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Query report numbers in normalized form rather than as written.
    pub normalize_report_numbers: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            normalize_report_numbers: true,
        }
    }
}

/// Look up every `s`, `a` and `r` value of `reference` with `matcher`.
///
/// Pubnotes matching two or more records are held in
/// [`Resolution::ambiguous`]; every other value is recorded against the
/// single record it matched or against [`MatchTarget::Unmatched`]. Values
/// are always recorded as written, whatever form was sent as the query.
pub fn resolve_parts(
    reference: &Reference,
    matcher: &dyn RecordMatcher,
    options: ResolverOptions,
) -> Resolution {
    let mut resolution = Resolution::default();

    for value in reference.pubnotes() {
        let ids = unique_ids(matcher.match_by_journal_pubnote(value));
        if ids.len() < 2 {
            let target = MatchTarget::from_ids(&ids);
            debug!(pubnote = %value, matched = %target, "resolved pubnote");
            resolution.pubnotes.record(target, value.clone());
        } else {
            debug!(pubnote = %value, candidates = ids.len(), "ambiguous pubnote");
            resolution.ambiguous.push(AmbiguousMatch {
                value: value.clone(),
                candidates: ids,
            });
        }
    }

    for value in reference.citations() {
        let ids = unique_ids(matcher.match_by_text(value));
        let target = MatchTarget::from_ids(&ids);
        debug!(citation = %value, matched = %target, hits = ids.len(), "resolved citation");
        resolution.citations.record(target, value.clone());
    }

    for value in reference.report_numbers() {
        let query = if options.normalize_report_numbers {
            normalize_report_number(value)
        } else {
            value.clone()
        };
        let ids = unique_ids(matcher.match_by_report_number(&query));
        let target = MatchTarget::from_ids(&ids);
        debug!(report_number = %value, %query, matched = %target, "resolved report number");
        resolution.report_numbers.record(target, value.clone());
    }

    resolution
}

fn unique_ids(ids: Vec<RecordId>) -> Vec<RecordId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
