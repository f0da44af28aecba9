//! Record-level driver: run every reference field of every record through
//! a [`ReferenceSplitter`] and keep the run statistics.

use std::collections::BTreeMap;
use std::fmt;

use refsplit_core::{MODIFIED_TAG, Record, RecordId, SplitConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::references::{FieldOutcome, ReferenceSplitter};

/// First lines of the audit log, explaining the per-field markers.
pub const LOG_HEADER: &str = "  Original reference\n= Common rest\n+ Split references\n";

const PROGRESS_EVERY: usize = 100;

/// How many references were split into how many parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SplitStats {
    counts: BTreeMap<usize, usize>,
}

impl SplitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, parts: usize) {
        *self.counts.entry(parts).or_default() += 1;
    }

    pub fn get(&self, parts: usize) -> usize {
        self.counts.get(&parts).copied().unwrap_or(0)
    }

    /// Number of references that were split.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(parts, count)| (*parts, *count))
    }
}

impl fmt::Display for SplitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (parts, count)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parts}: {count}")?;
        }
        f.write_str("}")
    }
}

/// Outcome of processing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub record_id: RecordId,
    /// At least one reference field was split.
    pub updated: bool,
    /// Largest number of parts any single reference was split into.
    pub max_split: usize,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub stats: SplitStats,
    /// Updated records whose largest split stays within the limit.
    pub regular: Vec<Record>,
    /// Updated records with at least one reference split beyond the limit.
    pub many: Vec<Record>,
    /// Audit text for updated records, without header and footer.
    pub log: String,
}

impl BatchReport {
    pub fn updated(&self) -> usize {
        self.regular.len() + self.many.len()
    }

    pub fn summary(&self) -> String {
        format!("Done with {} records: {}", self.processed, self.stats)
    }

    /// Complete audit log: header, per-record entries, summary line.
    pub fn render_log(&self) -> String {
        format!("{LOG_HEADER}{}\n\n{}", self.log, self.summary())
    }
}

pub struct BatchRunner<'m> {
    splitter: ReferenceSplitter<'m>,
    tag: String,
    limit_split: usize,
}

impl<'m> BatchRunner<'m> {
    pub fn new(splitter: ReferenceSplitter<'m>, config: &SplitConfig) -> Self {
        Self {
            splitter,
            tag: config.tag.clone(),
            limit_split: config.limit_split,
        }
    }

    /// Rewrite the reference fields of `record` in place.
    ///
    /// Reference fields are moved behind the other fields, keeping their
    /// relative order; a split field is replaced by its parts.
    pub fn process_record(&self, record: &mut Record, stats: &mut SplitStats) -> RecordReport {
        let mut report = RecordReport {
            record_id: record.id,
            updated: false,
            max_split: 0,
            log: format!("\n{} ===========================\n", record.id),
        };

        for field in record.take_fields(&self.tag) {
            match self.splitter.process_field(&field) {
                FieldOutcome::Unchanged(field) => record.add_field(field),
                FieldOutcome::Split {
                    fields,
                    clean_log,
                    log,
                } => {
                    if !clean_log.is_empty() {
                        report
                            .log
                            .push_str(&format!("Cleanup in {} : {clean_log}\n", record.id));
                    }
                    report.log.push_str(&log);

                    let parts = fields.len();
                    debug!(record = %record.id, parts, "reference split");
                    stats.record(parts);
                    report.max_split = report.max_split.max(parts);
                    report.updated = true;
                    for field in fields {
                        record.add_field(field);
                    }
                }
            }
        }

        report
    }

    /// Process a whole collection, routing updated records by split size.
    ///
    /// Output records carry the id, the last-modified stamp and the
    /// reference fields only.
    pub fn run(&self, records: impl IntoIterator<Item = Record>) -> BatchReport {
        let mut batch = BatchReport::default();

        for mut record in records {
            batch.processed += 1;
            let report = self.process_record(&mut record, &mut batch.stats);

            if batch.processed % PROGRESS_EVERY == 0 {
                info!(
                    processed = batch.processed,
                    record = %record.id,
                    stats = %batch.stats,
                    "progress"
                );
            }

            if !report.updated {
                continue;
            }
            batch.log.push_str(&report.log);
            let output = record.projection(&[MODIFIED_TAG, self.tag.as_str()]);
            if report.max_split > self.limit_split {
                batch.many.push(output);
            } else {
                batch.regular.push(output);
            }
        }

        info!(
            processed = batch.processed,
            updated = batch.updated(),
            stats = %batch.stats,
            "batch finished"
        );
        batch
    }
}
