//! Configuration module for the vk-doc-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, OptionsConfig, ViewerConfig};
pub use validation::{parse_cookie_arg, validate_config};
