//! Path safety checks for target file names

use crate::error::{Error, FileNameViolation, Result};

/// Check that a target file name is a safe relative path.
///
/// Rejects, in this order: empty names, names containing newline, carriage
/// return or null characters, absolute paths (`/x`, `\x`, `C:\x`, `C:/x`),
/// and any `..` segment regardless of where it appears.
pub fn validate_file_name(file_name: &str) -> Result<()> {
    match file_name_violation(file_name) {
        Some(reason) => Err(Error::InvalidFileName {
            file_name: file_name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Classify why a file name is unsafe, or `None` if it is acceptable.
pub fn file_name_violation(file_name: &str) -> Option<FileNameViolation> {
    if file_name.is_empty() {
        return Some(FileNameViolation::Empty);
    }
    if file_name.contains(['\n', '\r', '\0']) {
        return Some(FileNameViolation::ControlCharacters);
    }
    if is_absolute(file_name) {
        return Some(FileNameViolation::Absolute);
    }
    if file_name.split(['/', '\\']).any(|segment| segment == "..") {
        return Some(FileNameViolation::PathTraversal);
    }
    None
}

fn is_absolute(file_name: &str) -> bool {
    if file_name.starts_with('/') || file_name.starts_with('\\') {
        return true;
    }
    // Windows drive prefix
    let bytes = file_name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
