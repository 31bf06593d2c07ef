//! Filesystem module.
//!
//! Provides:
//! - Storage folder layout by content type
//! - Filename derivation and sanitization

pub mod naming;
pub mod paths;

pub use naming::{default_stem, file_name_from_link, sanitize_filename, sanitize_path_component};
pub use paths::{category_dir, ensure_dir};
