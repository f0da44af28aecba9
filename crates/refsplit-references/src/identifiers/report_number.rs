use once_cell::sync::Lazy;
use regex::Regex;

// `arxiv:1207 7214`, `arxiv 1207.7214v2` and the like; runs on lower-cased input.
static ARXIV_SPACED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"arxiv[ :]+(\d+)[ .]+(\d+).*").expect("valid spaced arXiv regex")
});

/// Canonical lookup form of a report number: lower-cased, trimmed, and with
/// an `arXiv <archive> <id>` spelling collapsed to `<archive>.<id>`.
pub fn normalize_report_number(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    ARXIV_SPACED
        .replace(&lowered, "${1}.${2}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_report_number("  CERN-TH-2005-001 "), "cern-th-2005-001");
    }

    #[test]
    fn collapses_spaced_arxiv_ids() {
        assert_eq!(normalize_report_number("arXiv:1207 7214"), "1207.7214");
        assert_eq!(normalize_report_number("arXiv 1207.7214 [hep-ph]"), "1207.7214");
        assert_eq!(normalize_report_number("ARXIV: 0901.2345v3"), "0901.2345");
    }

    #[test]
    fn keeps_old_style_ids() {
        assert_eq!(normalize_report_number("hep-th/0501001"), "hep-th/0501001");
    }
}
