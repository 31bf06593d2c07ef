//! Target list parsing.

use std::collections::BTreeMap;
use std::path::Path;

use crate::download::DownloadTarget;
use crate::error::Result;
use crate::fs::default_stem;

/// A URL with an optional caller-chosen file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLine {
    pub url: String,
    pub file_name: Option<String>,
}

/// Parse target list text: one `URL [file_name]` per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_target_lines(text: &str) -> Vec<TargetLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let url = parts.next()?.to_string();
            let file_name = parts.next().map(str::to_string);
            Some(TargetLine { url, file_name })
        })
        .collect()
}

/// Read and parse a target list file.
pub fn read_target_file(path: &Path) -> Result<Vec<TargetLine>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_target_lines(&text))
}

/// Turn parsed lines into download targets sharing a save path and cookies.
pub fn build_targets(
    lines: Vec<TargetLine>,
    save_path: &Path,
    cookies: &BTreeMap<String, String>,
) -> Vec<DownloadTarget> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let file_name = line
                .file_name
                .unwrap_or_else(|| default_stem(&line.url, index + 1));
            DownloadTarget::new(line.url, save_path, file_name).with_cookies(cookies.clone())
        })
        .collect()
}
