//! VK Doc Downloader - downloads media and document attachments from VK links.
//!
//! # Features
//!
//! - Content-type driven classification of responses
//! - Document viewer pages resolved to the file they wrap
//! - Streaming downloads sorted into `<type>/<subtype>/` folders
//! - Bounded concurrency through a shared permit pool
//! - A result record for every URL, never a propagated error
//!
//! # Example
//!
//! ```no_run
//! use vk_doc_downloader::{Config, DownloadTarget, Fetcher, PermitPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = Fetcher::from_config(&config)?;
//!     let pool = PermitPool::new(config.options.concurrency);
//!
//!     let target = DownloadTarget::new("https://vk.com/doc1_2", "downloads", "doc1_2");
//!     let result = fetcher.fetch(&target, &pool).await;
//!     println!("{} -> {}", result.url, result.file_info);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod resolve;

// Re-exports for convenience
pub use config::Config;
pub use download::{
    run_batch, BatchStats, DownloadResult, DownloadTarget, Fetcher, FileInfo, PermitPool,
};
pub use error::{Error, Result};
pub use media::{ContentKind, ContentTypeInfo};
pub use resolve::{AssetExtractor, EmbeddedElementExtractor, LinkResolver};
