//! Caption template and text value types.
//!
//! A [`Template`] is an ordered list of caption lines. An empty line is a
//! blank slot that takes one caption text verbatim; a non-empty line may
//! carry wildcard markers (`*` by default) that are filled in place.
//!
//! # Example
//!
//! ```ignore
//! let template = Template {
//!     title: "Do you want ants?".to_string(),
//!     url_prefix: "ants".to_string(),
//!     custom_image: None,
//!     lines: vec![
//!         "Do you want *?".to_string(),
//!         "because that's how you get *".to_string(),
//!     ],
//! };
//! ```

use serde::{Deserialize, Serialize};

/// A caption template definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Human-readable template title
    #[serde(alias = "memeTitle")]
    pub title: String,

    /// Image identifier used by the image API (e.g. `ants`, `drake`)
    #[serde(default)]
    pub url_prefix: String,

    /// Background image address; switches the template to custom-image mode
    #[serde(default, alias = "customImg", skip_serializing_if = "Option::is_none")]
    pub custom_image: Option<String>,

    /// Ordered caption lines; `""` is a blank slot
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Template {
    /// Custom background image, if one is set and non-empty
    pub fn custom_image(&self) -> Option<&str> {
        self.custom_image.as_deref().filter(|image| !image.is_empty())
    }

    /// Image identifier segment used in the generated path
    pub fn image_id(&self) -> &str {
        if self.custom_image().is_some() {
            "custom"
        } else {
            &self.url_prefix
        }
    }
}

/// A single caption text snippet supplied by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptionText {
    pub text: String,
}

impl CaptionText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for CaptionText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CaptionText {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// On-disk catalog of templates and caption texts.
///
/// Texts may be written either as plain strings or as `{ "text": ... }`
/// records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub templates: Vec<Template>,

    #[serde(default)]
    pub texts: Vec<CatalogText>,
}

/// Catalog text entry, accepted in either shorthand or record form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogText {
    Plain(String),
    Record(CaptionText),
}

impl From<CatalogText> for CaptionText {
    fn from(entry: CatalogText) -> Self {
        match entry {
            CatalogText::Plain(text) => CaptionText { text },
            CatalogText::Record(record) => record,
        }
    }
}
