//! Per-URL fetch workflow.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Serialize, Serializer};

use crate::config::Config;
use crate::download::permits::PermitPool;
use crate::download::stream::stream_to_file;
use crate::error::{Error, Result};
use crate::fs::{category_dir, ensure_dir, file_name_from_link, sanitize_filename};
use crate::media::{ContentKind, ContentTypeInfo};
use crate::resolve::{EmbeddedElementExtractor, LinkResolver};

/// A single URL to fetch.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub url: String,
    /// Root directory; files land in `save_path/<data_type>/<extension>/`.
    pub save_path: PathBuf,
    /// Stem used when no better name is available.
    pub file_name: String,
    /// Forwarded verbatim to the viewer page request.
    pub cookies: BTreeMap<String, String>,
}

impl DownloadTarget {
    pub fn new(
        url: impl Into<String>,
        save_path: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            save_path: save_path.into(),
            file_name: file_name.into(),
            cookies: BTreeMap::new(),
        }
    }

    pub fn with_cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }
}

/// Outcome class of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInfo {
    /// Saved; holds the `data_type/extension` of the payload.
    Media(String),
    /// Reachable, but not a kind we download.
    NotParsed,
    /// Any failure.
    Error,
}

impl FileInfo {
    pub fn as_str(&self) -> &str {
        match self {
            FileInfo::Media(full_type_info) => full_type_info,
            FileInfo::NotParsed => "not_parse",
            FileInfo::Error => "error",
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FileInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result record returned for every target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// Effective URL on success or `not_parse`, the input URL on error.
    pub url: String,
    pub file_info: FileInfo,
    /// Where the payload was written, if anything was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DownloadResult {
    pub fn saved(url: impl Into<String>, full_type_info: impl Into<String>, path: PathBuf) -> Self {
        Self {
            url: url.into(),
            file_info: FileInfo::Media(full_type_info.into()),
            path: Some(path),
        }
    }

    pub fn not_parsed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_info: FileInfo::NotParsed,
            path: None,
        }
    }

    pub fn error(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_info: FileInfo::Error,
            path: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.file_info, FileInfo::Media(_))
    }
}

/// Request-level settings shared by every fetch of a run.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub default_headers: HeaderMap,
    pub request_timeout: Duration,
    /// Matched against the requested URL to recognize document viewer pages.
    pub viewer_pattern: Regex,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        let accept_language = HeaderValue::from_str(&config.options.accept_language).map_err(
            |e| Error::ConfigValidation {
                field: "accept_language".to_string(),
                message: e.to_string(),
            },
        )?;
        default_headers.insert(header::ACCEPT_LANGUAGE, accept_language);

        Ok(Self {
            user_agent: config.options.user_agent.clone(),
            default_headers,
            request_timeout: config.request_timeout(),
            viewer_pattern: Regex::new(&config.viewer.url_pattern)?,
        })
    }
}

/// Runs the fetch workflow: request, classify, then save directly or via a viewer page.
pub struct Fetcher {
    settings: FetchSettings,
    resolver: LinkResolver,
}

impl Fetcher {
    pub fn new(settings: FetchSettings, resolver: LinkResolver) -> Self {
        Self { settings, resolver }
    }

    /// Build a fetcher with the default embedded element extraction.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = EmbeddedElementExtractor::new(&config.viewer.embed_tags)?;
        let resolver = LinkResolver::new(
            config.viewer_timeout(),
            config.viewer.error_title_marker.clone(),
            Box::new(extractor),
        );
        Ok(Self::new(FetchSettings::from_config(config)?, resolver))
    }

    /// Fetch one target. Never fails: errors become a `FileInfo::Error` record.
    pub async fn fetch(&self, target: &DownloadTarget, pool: &PermitPool) -> DownloadResult {
        match self.try_fetch(target, pool).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", target.url, e);
                tracing::debug!("{}", e.chain());
                DownloadResult::error(target.url.clone())
            }
        }
    }

    async fn try_fetch(&self, target: &DownloadTarget, pool: &PermitPool) -> Result<DownloadResult> {
        // Held until the payload is fully written.
        let _permit = pool.acquire().await?;
        let client = self.build_client()?;

        tracing::trace!("GET {}", target.url);
        let response = client
            .get(target.url.as_str())
            .timeout(self.settings.request_timeout)
            .send()
            .await?;
        ensure_ok(&response, &target.url)?;

        let content_type = content_type_of(&response, &target.url)?;
        match ContentKind::classify(&content_type) {
            ContentKind::Media => self.download_direct(response, &content_type, target).await,
            ContentKind::Html if self.is_viewer(&target.url) => {
                self.download_via_viewer(&client, response, target).await
            }
            _ => Ok(DownloadResult::not_parsed(response.url().as_str())),
        }
    }

    fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(&self.settings.user_agent)
            .default_headers(self.settings.default_headers.clone())
            .build()?;
        Ok(client)
    }

    fn is_viewer(&self, url: &str) -> bool {
        self.settings.viewer_pattern.is_match(url)
    }

    async fn download_direct(
        &self,
        response: Response,
        content_type: &str,
        target: &DownloadTarget,
    ) -> Result<DownloadResult> {
        let info = ContentTypeInfo::parse(content_type)?;
        let download_dir = category_dir(&target.save_path, &info)?;
        ensure_dir(&download_dir).await?;

        let name = sanitize_filename(&format!("{}.{}", target.file_name, info.extension))?;
        let effective_url = response.url().to_string();
        let path = stream_to_file(response, &download_dir, &name).await?;

        Ok(DownloadResult::saved(effective_url, info.full_type_info, path))
    }

    async fn download_via_viewer(
        &self,
        client: &Client,
        response: Response,
        target: &DownloadTarget,
    ) -> Result<DownloadResult> {
        let viewer_url = response.url().to_string();
        drop(response);

        let link = self
            .resolver
            .resolve(client, &viewer_url, &target.cookies)
            .await?;

        tracing::trace!("GET asset {}", link.url);
        let asset = client
            .get(link.url.as_str())
            .timeout(self.settings.request_timeout)
            .send()
            .await?;
        ensure_ok(&asset, &link.url)?;

        let info = ContentTypeInfo::parse(&content_type_of(&asset, &link.url)?)?;
        let download_dir = category_dir(&target.save_path, &info)?;
        ensure_dir(&download_dir).await?;

        let name = match file_name_from_link(&link.raw).and_then(|n| sanitize_filename(&n).ok()) {
            Some(name) => name,
            None => sanitize_filename(&format!("{}.{}", target.file_name, info.extension))?,
        };
        let effective_url = asset.url().to_string();
        let path = stream_to_file(asset, &download_dir, &name).await?;

        Ok(DownloadResult::saved(effective_url, info.full_type_info, path))
    }
}

fn ensure_ok(response: &Response, url: &str) -> Result<()> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

fn content_type_of(response: &Response, url: &str) -> Result<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| Error::MissingContentType(url.to_string()))
}
