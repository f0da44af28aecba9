use std::fs;
use std::path::Path;

use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{RefsplitError, Result};
use crate::models::{ControlField, DataField, Record, RecordId, Subfield};

const MARC_NAMESPACE: &str = "http://www.loc.gov/MARC21/slim";
const ID_TAG: &str = "001";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "collection")]
struct XmlCollection {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "Option::is_none")]
    xmlns: Option<String>,
    #[serde(rename = "record", default)]
    records: Vec<XmlRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "record")]
struct XmlRecord {
    #[serde(rename = "controlfield", default)]
    controlfields: Vec<XmlControlField>,
    #[serde(rename = "datafield", default)]
    datafields: Vec<XmlDataField>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlControlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlDataField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "@ind1", default)]
    ind1: String,
    #[serde(rename = "@ind2", default)]
    ind2: String,
    #[serde(rename = "subfield", default)]
    subfields: Vec<XmlSubfield>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$text", default)]
    value: String,
}

/// Parse a MARCXML `<collection>` (or a lone `<record>`) into records.
pub fn parse_collection(xml: &str) -> Result<Vec<Record>> {
    let xml_records = if xml.contains("<collection") {
        let collection: XmlCollection =
            from_str(xml).map_err(|e| RefsplitError::Xml(format!("invalid MARCXML: {e}")))?;
        collection.records
    } else {
        let record: XmlRecord =
            from_str(xml).map_err(|e| RefsplitError::Xml(format!("invalid MARCXML: {e}")))?;
        vec![record]
    };

    xml_records.into_iter().map(into_record).collect()
}

pub fn load_collection(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)?;
    parse_collection(&contents)
}

/// Render records as an indented MARCXML collection with an XML declaration.
pub fn to_collection_xml(records: &[Record]) -> Result<String> {
    let collection = XmlCollection {
        xmlns: Some(MARC_NAMESPACE.to_string()),
        records: records.iter().map(from_record).collect(),
    };

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let mut serializer = Serializer::new(&mut xml);
    serializer.indent(' ', 2);
    collection
        .serialize(serializer)
        .map_err(|e| RefsplitError::Xml(format!("failed to write MARCXML: {e}")))?;
    xml.push('\n');
    Ok(xml)
}

fn into_record(xml_record: XmlRecord) -> Result<Record> {
    let id = xml_record
        .controlfields
        .iter()
        .find(|cf| cf.tag == ID_TAG)
        .ok_or_else(|| RefsplitError::InvalidRecord("record without controlfield 001".to_string()))?
        .value
        .parse::<RecordId>()?;

    let controlfields = xml_record
        .controlfields
        .into_iter()
        .filter(|cf| cf.tag != ID_TAG)
        .map(|cf| ControlField::new(cf.tag, cf.value))
        .collect();

    let fields = xml_record
        .datafields
        .into_iter()
        .map(|df| {
            let subfields = df
                .subfields
                .into_iter()
                .filter_map(|sf| {
                    let code = sf.code.chars().next()?;
                    Some(Subfield::new(code, sf.value))
                })
                .collect();
            DataField::new(df.tag, indicator(&df.ind1), indicator(&df.ind2), subfields)
        })
        .collect();

    Ok(Record {
        id,
        controlfields,
        fields,
    })
}

fn from_record(record: &Record) -> XmlRecord {
    XmlRecord {
        controlfields: std::iter::once(XmlControlField {
            tag: ID_TAG.to_string(),
            value: record.id.to_string(),
        })
        .chain(record.controlfields.iter().map(|cf| XmlControlField {
            tag: cf.tag.clone(),
            value: cf.value.clone(),
        }))
        .collect(),
        datafields: record
            .fields
            .iter()
            .map(|field| XmlDataField {
                tag: field.tag.clone(),
                ind1: field.ind1.to_string(),
                ind2: field.ind2.to_string(),
                subfields: field
                    .subfields
                    .iter()
                    .map(|sf| XmlSubfield {
                        code: sf.code.to_string(),
                        value: sf.value.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn indicator(raw: &str) -> char {
    raw.chars().next().unwrap_or(' ')
}
