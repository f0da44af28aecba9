//! A [`RecordMatcher`] over a JSON catalog of known records.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use refsplit_core::{Record, RecordId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReferenceError, Result};
use crate::identifiers::{extract_dois_from_text, normalize_doi, normalize_report_number};
use crate::matcher::RecordMatcher;
use crate::references::dedup::{contains, is_word_char};

/// Titles shorter than this are too generic to match free text on.
const MIN_TITLE_LEN: usize = 12;
/// Report numbers need this many words to be searched for in free text.
const MIN_REPORT_NUMBER_WORDS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub report_numbers: Vec<String>,
    #[serde(default)]
    pub pubnotes: Vec<String>,
    #[serde(default)]
    pub dois: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

/// Lookup key for a pubnote: its words, lower-cased, comma separated.
pub fn pubnote_key(value: &str) -> String {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Default)]
pub struct CatalogMatcher {
    entries: Vec<CatalogEntry>,
    by_pubnote: HashMap<String, Vec<RecordId>>,
    by_report_number: HashMap<String, Vec<RecordId>>,
    by_doi: HashMap<String, Vec<RecordId>>,
    years: HashMap<RecordId, String>,
}

impl CatalogMatcher {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut matcher = Self::default();
        for entry in &entries {
            for pubnote in &entry.pubnotes {
                push_unique(&mut matcher.by_pubnote, pubnote_key(pubnote), entry.id);
            }
            for report_number in &entry.report_numbers {
                push_unique(
                    &mut matcher.by_report_number,
                    normalize_report_number(report_number),
                    entry.id,
                );
            }
            for doi in &entry.dois {
                match normalize_doi(doi) {
                    Some(doi) => push_unique(&mut matcher.by_doi, doi, entry.id),
                    None => warn!(record = %entry.id, doi = %doi, "ignoring malformed DOI"),
                }
            }
            if let Some(year) = &entry.year {
                matcher.years.insert(entry.id, year.clone());
            }
        }
        matcher.entries = entries;
        matcher
    }

    /// Load a catalog from a JSON array of [`CatalogEntry`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&contents).map_err(|e| {
            ReferenceError::Catalog(format!("invalid catalog {}: {e}", path.display()))
        })?;
        debug!(entries = entries.len(), path = %path.display(), "catalog loaded");
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill in years for catalog records from the `tag`/`code` subfields of
    /// stored records. Years already in the catalog win.
    pub fn with_years_from_records(mut self, records: &[Record], tag: &str, code: char) -> Self {
        for record in records {
            if self.years.contains_key(&record.id) {
                continue;
            }
            if let Some(year) = record.field_values(tag, code).into_iter().next() {
                self.years.insert(record.id, year);
            }
        }
        self
    }
}

/// Normalized report number usable as a free-text search key.
///
/// Empty words would match any separator gap and single words any bare
/// number, so both disqualify a key.
fn text_search_key(report_number: &str) -> Option<String> {
    let key = normalize_report_number(report_number);
    let words: Vec<&str> = key.split(|c: char| !is_word_char(c)).collect();
    if words.len() < MIN_REPORT_NUMBER_WORDS || words.iter().any(|word| word.is_empty()) {
        return None;
    }
    Some(key)
}

fn push_unique(index: &mut HashMap<String, Vec<RecordId>>, key: String, id: RecordId) {
    if key.is_empty() {
        return;
    }
    let ids = index.entry(key).or_default();
    if !ids.contains(&id) {
        ids.push(id);
    }
}

impl RecordMatcher for CatalogMatcher {
    fn match_by_text(&self, value: &str) -> Vec<RecordId> {
        let query = value.to_lowercase();
        let mut ids: Vec<RecordId> = Vec::new();

        for doi in extract_dois_from_text(value) {
            for id in self.by_doi.get(&doi).into_iter().flatten() {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }

        for entry in &self.entries {
            if ids.contains(&entry.id) {
                continue;
            }
            let title_hit = entry.title.as_deref().is_some_and(|title| {
                let title = title.trim().to_lowercase();
                title.len() >= MIN_TITLE_LEN && query.contains(&title)
            });
            let report_hit = entry
                .report_numbers
                .iter()
                .filter_map(|report_number| text_search_key(report_number))
                .any(|key| contains(&key, &query));
            if title_hit || report_hit {
                ids.push(entry.id);
            }
        }

        ids
    }

    fn match_by_report_number(&self, value: &str) -> Vec<RecordId> {
        self.by_report_number
            .get(&normalize_report_number(value))
            .cloned()
            .unwrap_or_default()
    }

    fn match_by_journal_pubnote(&self, value: &str) -> Vec<RecordId> {
        self.by_pubnote
            .get(&pubnote_key(value))
            .cloned()
            .unwrap_or_default()
    }

    fn year_of_record(&self, id: RecordId) -> Option<String> {
        self.years.get(&id).cloned()
    }
}
