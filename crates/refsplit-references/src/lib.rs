//! Refsplit references: cleanup and splitting of reference fields that
//! merge several cited works.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod identifiers;
pub mod matcher;
pub mod references;

pub use batch::{BatchReport, BatchRunner, LOG_HEADER, RecordReport, SplitStats};
pub use catalog::{CatalogEntry, CatalogMatcher};
pub use error::{ReferenceError, Result};
pub use matcher::{RecordMatcher, StaticMatcher};
pub use references::{
    ChangeLog, FieldOutcome, Reference, ReferenceSplitter, SplitDecision, SplitOptions, SplitPart,
};
