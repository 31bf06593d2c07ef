//! Configuration structures and loading logic.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Cookies forwarded verbatim to document viewer requests.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Maximum number of simultaneously open HTTP sessions.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for the main request and the asset request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for the document viewer page request.
    #[serde(default = "default_viewer_timeout")]
    pub viewer_timeout_seconds: u64,

    /// Value of the `Accept-Language` header.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            concurrency: default_concurrency(),
            request_timeout_seconds: default_request_timeout(),
            viewer_timeout_seconds: default_viewer_timeout(),
            accept_language: default_accept_language(),
            user_agent: default_user_agent(),
        }
    }
}

/// Document viewer detection and scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Regex matched against the requested URL to recognize viewer pages.
    #[serde(default = "default_url_pattern")]
    pub url_pattern: String,

    /// Text in the page title that marks an access error page.
    #[serde(default = "default_error_title_marker")]
    pub error_title_marker: String,

    /// Elements whose `src` holds the asset link, in priority order.
    #[serde(default = "default_embed_tags")]
    pub embed_tags: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            url_pattern: default_url_pattern(),
            error_title_marker: default_error_title_marker(),
            embed_tags: default_embed_tags(),
        }
    }
}

fn default_concurrency() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    15
}

fn default_viewer_timeout() -> u64 {
    5
}

fn default_accept_language() -> String {
    "ru".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_url_pattern() -> String {
    r"vk\.com/doc".to_string()
}

fn default_error_title_marker() -> String {
    "Ошибка".to_string()
}

fn default_embed_tags() -> Vec<String> {
    vec!["img".to_string(), "iframe".to_string()]
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.options.request_timeout_seconds)
    }

    pub fn viewer_timeout(&self) -> Duration {
        Duration::from_secs(self.options.viewer_timeout_seconds)
    }
}
