//! Centralized name checks for directory entries and generated file names.
//!
//! Two kinds of names flow through the pipeline:
//!
//! - **Source names**: directory names in the staging tree. Namespaces and
//!   projects share one rule: anything starting with `.` (`.git`, `.github`,
//!   `.hidden`) is not content.
//! - **Output names**: file stems derived from data (sample display names).
//!   These end up as paths under the output root, so they must stay a single
//!   path component.

/// Whether a directory entry name is hidden (starts with `.`).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Validate a data-derived name for use as a single file stem.
///
/// Returns the name with surrounding whitespace trimmed when it is safe, `None`
/// when it would be empty, hidden, a relative path component, or contain a
/// path separator.
///
/// - `"S1"` → `Some("S1")`
/// - `"frog 1"` → `Some("frog 1")`
/// - `"../etc"` → `None`
/// - `"a/b"` → `None`
/// - `".profile"` → `None`
pub fn safe_file_stem(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || is_hidden(trimmed)
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
    {
        return None;
    }
    Some(trimmed)
}

/// Join a file stem and an extension (`".json"`, or empty for none).
pub fn file_name(stem: &str, extension: &str) -> String {
    format!("{stem}{extension}")
}
