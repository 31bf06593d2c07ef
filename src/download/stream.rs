//! Streaming response bodies to disk.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use reqwest::Response;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Stream a response body into `dir/name`, returning the written path.
pub async fn stream_to_file(response: Response, dir: &Path, name: &str) -> Result<PathBuf> {
    let output_path = dir.join(name);
    let written = write_chunks(response.bytes_stream(), &output_path).await?;
    tracing::trace!("Wrote {} bytes to {}", written, output_path.display());
    Ok(output_path)
}

/// Append every chunk of `chunks` to a freshly truncated file, in arrival order.
///
/// A failing chunk aborts the copy and leaves the partial file in place.
pub async fn write_chunks<S, B, E>(chunks: S, output_path: &Path) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut file = File::create(output_path).await?;
    let mut chunks = std::pin::pin!(chunks);
    let mut written: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
