//! Cleanup and splitting of reference fields that merge several citations.

pub mod builder;
pub mod changelog;
pub mod cleaner;
pub mod consolidate;
pub mod dedup;
pub mod garbage;
pub mod parser;
pub mod resolver;
pub mod splitter;

pub use builder::{BuiltFields, CommonPart, build_split_fields, common_part};
pub use changelog::ChangeLog;
pub use cleaner::{clean, clean_reference};
pub use consolidate::{SplitDecision, SplitPart, consolidate};
pub use parser::{PartKind, Reference, parse_reference};
pub use resolver::{AmbiguousMatch, MatchSet, MatchTarget, Resolution, ResolverOptions, resolve_parts};
pub use splitter::{FieldOutcome, ReferenceSplitter, SplitOptions};
