//! Gallery images for the landing page

use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaKind};
use super::validation::{Fallback, Field, Rule};

/// One gallery image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Absolute http(s) URL, normalized
    pub url: String,
    pub caption: Option<String>,
    /// Display position, ascending
    pub order: i64,
}

impl GalleryImage {
    /// Sort images for display. Stable, so equal `order` keeps retrieval order.
    pub fn sort_for_display(images: &mut [GalleryImage]) {
        images.sort_by_key(|image| image.order);
    }
}

impl Schema for GalleryImage {
    const KIND: SchemaKind = SchemaKind::GalleryImage;
    const FIELDS: &'static [Field] = &[
        Field::required("url", Rule::HttpUrl),
        Field::optional("caption", Rule::STR),
        Field::with_default(
            "order",
            Rule::Int {
                ge: Some(0),
                le: None,
            },
            Fallback::Int(0),
        ),
    ];
}
