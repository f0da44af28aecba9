use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use refsplit_core::RecordId;

/// Lookups against the record collection that references point into.
///
/// Every query is best effort: a backend that fails must answer with an
/// empty result, which the resolver treats as "unmatched". Result order is
/// significant for pubnotes that match several records.
pub trait RecordMatcher: Send + Sync {
    /// Free-text search for a citation string.
    fn match_by_text(&self, value: &str) -> Vec<RecordId>;

    fn match_by_report_number(&self, value: &str) -> Vec<RecordId>;

    /// Structured lookup of a journal pubnote such as `JHEP,0505,078`.
    fn match_by_journal_pubnote(&self, value: &str) -> Vec<RecordId>;

    /// Publication year stored on the record itself, if any.
    fn year_of_record(&self, id: RecordId) -> Option<String>;
}

/// In-memory matcher answering from exact-string tables.
#[derive(Debug, Default)]
pub struct StaticMatcher {
    texts: HashMap<String, Vec<RecordId>>,
    report_numbers: HashMap<String, Vec<RecordId>>,
    pubnotes: HashMap<String, Vec<RecordId>>,
    years: HashMap<RecordId, String>,
    queries: AtomicUsize,
}

impl StaticMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, value: &str, ids: &[u64]) -> Self {
        self.texts.insert(value.to_string(), to_ids(ids));
        self
    }

    pub fn with_report_number(mut self, value: &str, ids: &[u64]) -> Self {
        self.report_numbers.insert(value.to_string(), to_ids(ids));
        self
    }

    pub fn with_pubnote(mut self, value: &str, ids: &[u64]) -> Self {
        self.pubnotes.insert(value.to_string(), to_ids(ids));
        self
    }

    pub fn with_year(mut self, id: u64, year: &str) -> Self {
        self.years.insert(RecordId(id), year.to_string());
        self
    }

    /// Number of match queries answered so far (year lookups excluded).
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn lookup(&self, table: &HashMap<String, Vec<RecordId>>, value: &str) -> Vec<RecordId> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        table.get(value).cloned().unwrap_or_default()
    }
}

fn to_ids(ids: &[u64]) -> Vec<RecordId> {
    ids.iter().copied().map(RecordId).collect()
}

impl RecordMatcher for StaticMatcher {
    fn match_by_text(&self, value: &str) -> Vec<RecordId> {
        self.lookup(&self.texts, value)
    }

    fn match_by_report_number(&self, value: &str) -> Vec<RecordId> {
        self.lookup(&self.report_numbers, value)
    }

    fn match_by_journal_pubnote(&self, value: &str) -> Vec<RecordId> {
        self.lookup(&self.pubnotes, value)
    }

    fn year_of_record(&self, id: RecordId) -> Option<String> {
        self.years.get(&id).cloned()
    }
}
