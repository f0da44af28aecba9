use refsplit_core::{DataField, SplitConfig, Subfield};
use tracing::debug;

use super::builder::build_split_fields;
use super::changelog::ChangeLog;
use super::cleaner;
use super::consolidate::{SplitDecision, consolidate};
use super::parser::Reference;
use super::resolver::{ResolverOptions, resolve_parts};
use crate::matcher::RecordMatcher;

#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// References with fewer pubnotes are left alone without any lookup.
    pub min_pubnotes: usize,
    pub resolver: ResolverOptions,
    pub provenance_note: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::from(&SplitConfig::default())
    }
}

impl From<&SplitConfig> for SplitOptions {
    fn from(config: &SplitConfig) -> Self {
        Self {
            min_pubnotes: config.min_pubnotes,
            resolver: ResolverOptions {
                normalize_report_numbers: config.normalize_report_numbers,
            },
            provenance_note: config.provenance_note.clone(),
        }
    }
}

/// What happened to one reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    Unchanged(DataField),
    Split {
        fields: Vec<DataField>,
        clean_log: ChangeLog,
        log: String,
    },
}

/// Runs clean, resolve, consolidate and build for reference fields.
pub struct ReferenceSplitter<'m> {
    matcher: &'m dyn RecordMatcher,
    options: SplitOptions,
}

impl<'m> ReferenceSplitter<'m> {
    pub fn new(matcher: &'m dyn RecordMatcher, options: SplitOptions) -> Self {
        Self { matcher, options }
    }

    pub fn clean_reference(&self, subfields: &[Subfield]) -> (Reference, ChangeLog) {
        cleaner::clean_reference(subfields)
    }

    /// Split a cleaned reference into one subfield list per cited work.
    pub fn split_reference(&self, reference: &Reference) -> SplitDecision {
        if reference.pubnotes().len() < self.options.min_pubnotes {
            return SplitDecision::Unchanged;
        }

        let resolution = resolve_parts(reference, self.matcher, self.options.resolver);
        consolidate(resolution, self.matcher)
    }

    /// Clean and split one stored reference field.
    pub fn process_field(&self, field: &DataField) -> FieldOutcome {
        let (reference, clean_log) = self.clean_reference(&field.subfields);

        let SplitDecision::Split(parts) = self.split_reference(&reference) else {
            return FieldOutcome::Unchanged(field.clone());
        };

        let built = build_split_fields(field, &parts, &self.options.provenance_note);
        if built.count() < 2 {
            debug!(outputs = built.count(), "split produced fewer than two fields");
            return FieldOutcome::Unchanged(field.clone());
        }

        FieldOutcome::Split {
            fields: built.fields,
            clean_log,
            log: built.log,
        }
    }
}
