//! Content-type header parsing and classification.

use std::fmt;

use crate::error::{Error, Result};

/// Marker preceding the encoding in a content-type header.
const CHARSET_MARKER: &str = "charset=";

/// Information carried by a `content-type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeInfo {
    /// Text encoding, present only when the header names a charset.
    pub encoding: Option<String>,
    /// Top-level type, e.g. `image` or `text`.
    pub data_type: String,
    /// Subtype, e.g. `gif` or `html`.
    pub extension: String,
    /// `data_type/extension`.
    pub full_type_info: String,
}

impl ContentTypeInfo {
    /// Parse a header value such as `text/html; charset=utf-8`.
    ///
    /// Everything after `charset=` becomes the encoding. The type portion (everything
    /// before the first `;`) must contain exactly one `/` with non-empty parts on both
    /// sides.
    pub fn parse(content_type: &str) -> Result<Self> {
        let encoding = content_type
            .find(CHARSET_MARKER)
            .map(|pos| content_type[pos + CHARSET_MARKER.len()..].trim().to_string());

        let type_part = match content_type.find(';') {
            Some(pos) => &content_type[..pos],
            None => content_type,
        }
        .trim();

        let mut parts = type_part.split('/');
        let (data_type, extension) = match (parts.next(), parts.next(), parts.next()) {
            (Some(data_type), Some(extension), None)
                if !data_type.is_empty() && !extension.is_empty() =>
            {
                (data_type, extension)
            }
            _ => return Err(Error::MalformedContentType(content_type.to_string())),
        };

        Ok(Self {
            encoding,
            data_type: data_type.to_string(),
            extension: extension.to_string(),
            full_type_info: format!("{}/{}", data_type, extension),
        })
    }
}

impl fmt::Display for ContentTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_type_info)
    }
}

/// How a response should be handled, judged from its raw content-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Image or audio payload, saved as-is.
    Media,
    /// HTML page, possibly a document viewer.
    Html,
    /// Anything else.
    Other,
}

impl ContentKind {
    /// Classify a raw content-type header value.
    pub fn classify(content_type: &str) -> Self {
        let lower = content_type.to_ascii_lowercase();
        if lower.contains("image") || lower.contains("audio") {
            ContentKind::Media
        } else if lower.contains("text/html") {
            ContentKind::Html
        } else {
            ContentKind::Other
        }
    }
}
