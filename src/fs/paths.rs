//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;
use crate::media::ContentTypeInfo;

/// Get the storage folder for a content type: `save_path/<data_type>/<extension>`.
pub fn category_dir(save_path: &Path, info: &ContentTypeInfo) -> Result<PathBuf> {
    let data_type = sanitize_path_component(&info.data_type)?;
    let extension = sanitize_path_component(&info.extension)?;
    Ok(save_path.join(data_type).join(extension))
}

/// Ensure a directory exists, creating it and any parents if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
