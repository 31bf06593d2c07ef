//! Error types for the vk-doc-downloader application.

use std::error::Error as StdError;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Transport errors
    #[error("Response status: {status} ({url})")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Response has no content-type header: {0}")]
    MissingContentType(String),

    #[error("Malformed content-type '{0}': expected 'type/extension'")]
    MalformedContentType(String),

    // Viewer page errors
    #[error("Document access error: {0}")]
    AccessDenied(String),

    #[error("No asset link found on viewer page: {0}")]
    UnresolvedViewerLink(String),

    // Concurrency
    #[error("Permit pool closed")]
    PermitPoolClosed,

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Render the error together with every underlying source, one per line.
    pub fn chain(&self) -> String {
        let mut out = format!("{:?}", self);
        let mut source = StdError::source(self);
        while let Some(err) = source {
            out.push_str(&format!("\n  caused by: {}", err));
            source = err.source();
        }
        out
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
