//! Download module for attachment fetching.
//!
//! This module provides:
//! - The per-URL fetch workflow
//! - Streaming bodies to disk
//! - The shared permit pool
//! - Batch runs and statistics

pub mod batch;
pub mod fetch;
pub mod permits;
pub mod state;
pub mod stream;

pub use batch::run_batch;
pub use fetch::{DownloadResult, DownloadTarget, FetchSettings, Fetcher, FileInfo};
pub use permits::PermitPool;
pub use state::BatchStats;
pub use stream::{stream_to_file, write_chunks};
