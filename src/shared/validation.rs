use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters allowed verbatim in a download file name
    /// - Kept: ASCII letters, digits, "_" and "-"
    /// - Replaced with "_": spaces, dots, slashes, non-ASCII
    pub static ref ARCHIVE_NAME_UNSAFE: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
}

/// Turn a collection name into a safe archive base name
pub fn sanitize_archive_name(name: &str) -> String {
    let sanitized = ARCHIVE_NAME_UNSAFE.replace_all(name, "_").to_string();
    if sanitized.is_empty() {
        "collection".to_string()
    } else {
        sanitized
    }
}

/// True when the value is empty or whitespace only
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
