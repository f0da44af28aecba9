pub mod doi;
pub mod report_number;

pub use doi::{extract_dois_from_text, normalize_doi};
pub use report_number::normalize_report_number;
