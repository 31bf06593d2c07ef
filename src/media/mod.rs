//! Media classification.

pub mod content_type;

pub use content_type::{ContentKind, ContentTypeInfo};
