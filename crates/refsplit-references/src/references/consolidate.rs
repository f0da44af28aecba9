use refsplit_core::{RecordId, Subfield};
use tracing::debug;

use super::parser::PartKind;
use super::resolver::{MatchTarget, Resolution};
use crate::matcher::RecordMatcher;

/// The parts of a reference that belong to one cited work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub target: MatchTarget,
    pub subfields: Vec<Subfield>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitDecision {
    /// Leave the reference field exactly as it was.
    Unchanged,
    /// One entry per cited work; the unmatched leftovers, if any, come last.
    Split(Vec<SplitPart>),
}

/// Attach every held ambiguous pubnote to a single record.
///
/// The first candidate that already owns a part wins, scanning candidates
/// in the order the matcher returned them. Without such a candidate the
/// pubnote goes to the first one. Holds are processed in the order they
/// were met, so an earlier fold counts as ownership for later ones.
pub fn fold_ambiguous(resolution: &mut Resolution) {
    let held = std::mem::take(&mut resolution.ambiguous);

    for ambiguous in held {
        let owner = ambiguous
            .candidates
            .iter()
            .copied()
            .find(|id| resolution.owns(*id));
        let target = match owner.or_else(|| ambiguous.candidates.first().copied()) {
            Some(id) => MatchTarget::Record(id),
            None => MatchTarget::Unmatched,
        };
        debug!(
            pubnote = %ambiguous.value,
            matched = %target,
            forced = owner.is_none(),
            "folded ambiguous pubnote"
        );
        resolution.pubnotes.record(target, ambiguous.value);
    }
}

/// Records owning at least one part: pubnote targets first, then
/// citation targets, then report-number targets, each in first-seen order.
pub fn cluster_keys(resolution: &Resolution) -> Vec<RecordId> {
    let mut keys = Vec::new();
    let targets = resolution
        .pubnotes
        .targets()
        .chain(resolution.citations.targets())
        .chain(resolution.report_numbers.targets());
    for id in targets.filter_map(|target| target.record_id()) {
        if !keys.contains(&id) {
            keys.push(id);
        }
    }
    keys
}

/// Subfields resolved to `target`, `a` before `r` before `s`.
pub fn collect_parts(resolution: &Resolution, target: MatchTarget) -> Vec<Subfield> {
    let categories = [
        (PartKind::Citation, &resolution.citations),
        (PartKind::ReportNumber, &resolution.report_numbers),
        (PartKind::Pubnote, &resolution.pubnotes),
    ];
    categories
        .into_iter()
        .flat_map(|(kind, set)| {
            set.get(target)
                .iter()
                .map(move |value| Subfield::new(kind.code(), value.clone()))
        })
        .collect()
}

/// Decide whether the resolved parts describe two or more cited works.
///
/// Each record becomes one part, carrying the record's own publication
/// year when the matcher knows it; unmatched values are gathered into one
/// trailing part. Fewer than two records, or fewer than two parts in the
/// end, means the reference stays as it is.
pub fn consolidate(mut resolution: Resolution, matcher: &dyn RecordMatcher) -> SplitDecision {
    fold_ambiguous(&mut resolution);

    let keys = cluster_keys(&resolution);
    if keys.len() < 2 {
        debug!(records = keys.len(), "not enough distinct records to split");
        return SplitDecision::Unchanged;
    }

    let mut parts = Vec::with_capacity(keys.len() + 1);
    for id in keys {
        let target = MatchTarget::Record(id);
        let mut subfields = collect_parts(&resolution, target);
        if subfields.is_empty() {
            continue;
        }
        if let Some(year) = matcher.year_of_record(id) {
            subfields.push(Subfield::new(PartKind::Year.code(), year));
        }
        parts.push(SplitPart { target, subfields });
    }

    let leftovers = collect_parts(&resolution, MatchTarget::Unmatched);
    if !leftovers.is_empty() {
        parts.push(SplitPart {
            target: MatchTarget::Unmatched,
            subfields: leftovers,
        });
    }

    if parts.len() < 2 {
        return SplitDecision::Unchanged;
    }
    SplitDecision::Split(parts)
}
