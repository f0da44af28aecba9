use std::fs;
use std::path::Path;

use crate::error::{RefsplitError, Result};
use crate::models::{Record, RecordId};

/// Load a JSON array of records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}

pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    Ok(records)
}

/// Save records as a pretty-printed JSON array, creating parent directories.
pub fn save_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

/// Find one record by id in a loaded collection.
pub fn find_record(records: &[Record], id: RecordId) -> Result<&Record> {
    records
        .iter()
        .find(|record| record.id == id)
        .ok_or_else(|| RefsplitError::RecordNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataField, Subfield};
    use tempfile::TempDir;

    fn record(id: u64, pubnote: &str) -> Record {
        let mut record = Record::new(id);
        record.add_field(DataField::new(
            "999",
            'C',
            '5',
            vec![Subfield::new('s', pubnote)],
        ));
        record
    }

    #[test]
    fn test_save_and_load_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("records.json");

        let records = vec![record(1, "JHEP,0505,078"), record(2, "Phys.Rev.,D70,1")];
        save_records(&path, &records).unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_parse_defaults_indicators() {
        let json = r#"[{"id": 7, "fields": [{"tag": "999", "subfields": [{"code": "s", "value": "x"}]}]}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].fields[0].ind1, ' ');
        assert_eq!(records[0].fields[0].subfields[0].code, 's');
    }

    #[test]
    fn test_find_record() {
        let records = vec![record(1, "a"), record(2, "b")];
        assert_eq!(find_record(&records, RecordId(2)).unwrap().id, RecordId(2));
        assert!(matches!(
            find_record(&records, RecordId(3)),
            Err(RefsplitError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_records(Path::new("/tmp/nonexistent_refsplit_records.json"));
        assert!(matches!(result, Err(RefsplitError::Io(_))));
    }
}
