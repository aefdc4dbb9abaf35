//! Shallow response parsing
//!
//! S3's Initiate/Complete bodies are flat XML and the headers we need
//! (`ETag`) are single lines, so anchored case-insensitive regexes are
//! enough; no XML parser needed. Patterns are anchored to whole elements and
//! whole header lines so they cannot match inside attribute values.

use regex::Regex;

/// Text content of the first element whose name matches `name_pattern`
/// (case-insensitive). Empty string when absent.
///
/// `name_pattern` is a regex fragment for the tag name, e.g. `"UploadId"`
/// or `"ETag"`; it must match the opening and closing tag of the same
/// element.
pub fn xml_tag(body: &str, name_pattern: &str) -> String {
    let pattern = format!(
        r"(?is)<\s*(?:{name})(?:\s[^>]*)?>\s*([^<]*?)\s*<\s*/\s*(?:{name})\s*>",
        name = name_pattern
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return String::new(),
    };
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Value of the first header line whose name matches `name_pattern`
/// (case-insensitive), trimmed. Empty string when absent. Multiple lines
/// with the same name yield the first.
pub fn http_header(header_block: &str, name_pattern: &str) -> String {
    let pattern = format!(r"(?im)^\s*(?:{}):[ \t]*(.*?)[ \t\r]*$", name_pattern);
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return String::new(),
    };
    re.captures(header_block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
