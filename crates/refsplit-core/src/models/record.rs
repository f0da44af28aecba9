use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RefsplitError;

/// Identifier of a bibliographic record in the record store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = RefsplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(RecordId)
            .map_err(|_| RefsplitError::InvalidRecord(format!("invalid record id: {s:?}")))
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One `(code, value)` pair of a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    pub code: char,
    pub value: String,
}

impl Subfield {
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

impl fmt::Display for Subfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$${}{}", self.code, self.value)
    }
}

fn blank_indicator() -> char {
    ' '
}

/// A tagged field with two indicators and an ordered list of subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub tag: String,
    #[serde(default = "blank_indicator")]
    pub ind1: char,
    #[serde(default = "blank_indicator")]
    pub ind2: char,
    #[serde(default)]
    pub subfields: Vec<Subfield>,
}

impl DataField {
    pub fn new(tag: impl Into<String>, ind1: char, ind2: char, subfields: Vec<Subfield>) -> Self {
        Self {
            tag: tag.into(),
            ind1,
            ind2,
            subfields,
        }
    }

    pub fn values(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.tag, self.ind1, self.ind2)?;
        for sf in &self.subfields {
            write!(f, " {sf}")?;
        }
        Ok(())
    }
}

/// Control field holding the record's last-modified timestamp.
pub const MODIFIED_TAG: &str = "005";

/// A tagged value without indicators or subfields, e.g. `005`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    pub tag: String,
    pub value: String,
}

impl ControlField {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// A bibliographic record: an id plus its data fields in stored order.
///
/// The id stands for control field `001`; `controlfields` holds the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controlfields: Vec<ControlField>,
    #[serde(default)]
    pub fields: Vec<DataField>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            controlfields: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn fields_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DataField> {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    /// Remove every field with `tag`, returning them in their stored order.
    pub fn take_fields(&mut self, tag: &str) -> Vec<DataField> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|field| field.tag == tag);
        self.fields = kept;
        taken
    }

    pub fn add_field(&mut self, field: DataField) {
        self.fields.push(field);
    }

    /// Values of subfield `code` across all fields tagged `tag`.
    pub fn field_values(&self, tag: &str, code: char) -> Vec<String> {
        self.fields_with_tag(tag)
            .flat_map(|field| field.values(code))
            .map(str::to_string)
            .collect()
    }

    /// Copy of the record keeping only control and data fields whose tag
    /// is listed. The id is always kept.
    pub fn projection(&self, tags: &[&str]) -> Record {
        Record {
            id: self.id,
            controlfields: self
                .controlfields
                .iter()
                .filter(|cf| tags.contains(&cf.tag.as_str()))
                .cloned()
                .collect(),
            fields: self
                .fields
                .iter()
                .filter(|field| tags.contains(&field.tag.as_str()))
                .cloned()
                .collect(),
        }
    }
}
