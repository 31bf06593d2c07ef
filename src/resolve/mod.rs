//! Document viewer resolution.
//!
//! Viewer pages wrap the real asset either in an embedded element or behind a
//! redirect. This module finds the asset link.

pub mod extractor;
pub mod link;

pub use extractor::{inspect_page, AssetExtractor, EmbeddedElementExtractor, ViewerPage};
pub use link::{cookie_header, LinkResolver, ResolvedLink};
