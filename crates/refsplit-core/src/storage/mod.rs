pub mod json_records;
pub mod marcxml;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::models::Record;

/// Load records from `path`, choosing MARCXML for `.xml` files and JSON otherwise.
pub fn load_any(path: &Path) -> Result<Vec<Record>> {
    let is_xml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    let records = if is_xml {
        marcxml::load_collection(path)?
    } else {
        json_records::load_records(path)?
    };
    debug!(path = %path.display(), records = records.len(), xml = is_xml, "records loaded");
    Ok(records)
}
