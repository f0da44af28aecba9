use once_cell::sync::Lazy;
use regex::Regex;

static DOI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+[A-Z0-9/]").expect("valid DOI regex")
});

const DOI_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Lower-cased bare DOI, or `None` when the input does not look like one.
pub fn normalize_doi(input: &str) -> Option<String> {
    let input = input.trim();
    let lowered = input.to_lowercase();

    let stripped = DOI_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(lowered.as_str())
        .trim_start();

    let (prefix, suffix) = stripped.split_once('/')?;
    if !prefix.starts_with("10.") || suffix.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

pub fn extract_dois_from_text(text: &str) -> Vec<String> {
    let mut dois: Vec<String> = Vec::new();
    for m in DOI_REGEX.find_iter(text) {
        let Some(doi) = normalize_doi(m.as_str()) else {
            continue;
        };
        if !dois.contains(&doi) {
            dois.push(doi);
        }
    }
    dois
}
