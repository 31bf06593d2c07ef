//! Asset link extraction from viewer page markup.

use scraper::{Html, Selector};

use crate::error::{Error, Result};

/// Strategy for finding the asset link inside a parsed viewer page.
pub trait AssetExtractor: Send + Sync {
    /// Return the raw (possibly relative) asset link, if the page has one.
    fn extract(&self, document: &Html) -> Option<String>;
}

/// Returns the `src` of the first element matching each selector, in priority order.
#[derive(Debug, Clone)]
pub struct EmbeddedElementExtractor {
    selectors: Vec<Selector>,
}

impl EmbeddedElementExtractor {
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Result<Self> {
        let selectors = tags
            .iter()
            .map(|tag| {
                Selector::parse(tag.as_ref()).map_err(|e| Error::ConfigValidation {
                    field: "embed_tags".to_string(),
                    message: format!("'{}': {}", tag.as_ref(), e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }
}

impl AssetExtractor for EmbeddedElementExtractor {
    fn extract(&self, document: &Html) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            document
                .select(selector)
                .next()
                .and_then(|element| element.value().attr("src"))
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(str::to_string)
        })
    }
}

/// What a viewer page offers once parsed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ViewerPage {
    pub title: Option<String>,
    pub asset_link: Option<String>,
}

/// Parse an HTML body and pull out the title and asset link.
pub fn inspect_page(body: &str, extractor: &dyn AssetExtractor) -> ViewerPage {
    let document = Html::parse_document(body);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    });

    ViewerPage {
        title,
        asset_link: extractor.extract(&document),
    }
}
