//! Filename derivation and sanitization.

use crate::error::{Error, Result};

/// Query marker that VK appends to direct document links.
const EXTRA_MARKER: &str = "?extra";

/// Derive a candidate file name from the last path segment of a link.
///
/// The segment is cut at the `?extra` marker if present. Returns `None` when the
/// input has no `/` at all; never fails.
pub fn file_name_from_link(link: &str) -> Option<String> {
    let (_, segment) = link.rsplit_once('/')?;
    let name = match segment.find(EXTRA_MARKER) {
        Some(pos) => &segment[..pos],
        None => segment,
    };
    Some(name.to_string())
}

/// Derive a file stem for a target when the caller did not name one.
///
/// The extension is dropped; the saved file gets one from its content-type.
pub fn default_stem(url: &str, index: usize) -> String {
    file_name_from_link(url)
        .map(|name| {
            let name = name.split('?').next().unwrap_or_default();
            match name.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                _ => name.to_string(),
            }
        })
        .and_then(|name| sanitize_filename(&name).ok())
        .unwrap_or_else(|| format!("attachment_{}", index))
}

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component (folder name) with less strict validation.
///
/// Separators are replaced rather than rejected; traversal is still an error.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
