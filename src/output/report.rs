//! JSON result reports.

use std::path::Path;

use crate::download::DownloadResult;
use crate::error::Result;

/// Write all results to `path` as a pretty-printed JSON array.
pub fn write_report(path: &Path, results: &[DownloadResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}
