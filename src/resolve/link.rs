//! Document viewer link resolution.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::resolve::extractor::{inspect_page, AssetExtractor};

/// Build a `Cookie` header value from a key/value map.
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Asset link found on a viewer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Absolute URL to request.
    pub url: String,
    /// The link as the page wrote it; file names are derived from this.
    pub raw: String,
}

/// Finds the real asset behind a document viewer page.
pub struct LinkResolver {
    timeout: Duration,
    error_title_marker: String,
    extractor: Box<dyn AssetExtractor>,
}

impl LinkResolver {
    pub fn new(
        timeout: Duration,
        error_title_marker: impl Into<String>,
        extractor: Box<dyn AssetExtractor>,
    ) -> Self {
        Self {
            timeout,
            error_title_marker: error_title_marker.into(),
            extractor,
        }
    }

    /// Fetch a viewer page and return the asset link it points to.
    ///
    /// An embedded element wins over a redirect. A page with neither is an
    /// [`Error::UnresolvedViewerLink`].
    pub async fn resolve(
        &self,
        client: &Client,
        url: &str,
        cookies: &BTreeMap<String, String>,
    ) -> Result<ResolvedLink> {
        let requested = Url::parse(url)?;

        let mut request = client.get(requested.clone()).timeout(self.timeout);
        if let Some(cookie) = cookie_header(cookies) {
            request = request.header(header::COOKIE, cookie);
        }

        tracing::trace!("GET viewer {}", url);
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);

        if is_html {
            let body = response.text().await?;
            let page = inspect_page(&body, self.extractor.as_ref());

            if page
                .title
                .as_deref()
                .is_some_and(|title| title.contains(&self.error_title_marker))
            {
                return Err(Error::AccessDenied(url.to_string()));
            }

            if let Some(link) = page.asset_link {
                let resolved = final_url.join(&link)?;
                tracing::trace!("Viewer {} embeds {}", url, resolved);
                return Ok(ResolvedLink {
                    url: resolved.to_string(),
                    raw: link,
                });
            }
        }

        if final_url != requested {
            tracing::trace!("Viewer {} redirected to {}", url, final_url);
            return Ok(ResolvedLink {
                url: final_url.to_string(),
                raw: final_url.to_string(),
            });
        }

        Err(Error::UnresolvedViewerLink(url.to_string()))
    }
}
