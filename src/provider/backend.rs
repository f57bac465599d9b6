//! Provider traits for caption texts and templates.
//!
//! The engine only needs [`TextProvider`]. [`MemeProvider`] layers the
//! catalog operations on top so an owning caller can pick templates and
//! manage the text pool through the same object.

use async_trait::async_trait;
use thiserror::Error;

use crate::template::{CaptionText, Template};

/// Errors that can occur during provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Texts were requested from a pool that has none
    #[error("Caption text pool is empty")]
    EmptyPool,

    /// Nothing matched the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catalog file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Source of random caption texts.
///
/// # Contract
///
/// `random_texts(count)` must return exactly `count` records. The records
/// carry no ordering or uniqueness guarantee.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single provider is shared by
/// every concurrent resolution.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Fetch `count` random caption texts.
    async fn random_texts(&self, count: usize) -> ProviderResult<Vec<CaptionText>>;
}

/// Full catalog provider: random texts plus templates and text management.
#[async_trait]
pub trait MemeProvider: TextProvider {
    /// Pick one template at random.
    async fn random_template(&self) -> ProviderResult<Template>;

    /// List all templates.
    async fn all_templates(&self) -> ProviderResult<Vec<Template>>;

    /// List all caption texts.
    async fn all_texts(&self) -> ProviderResult<Vec<CaptionText>>;

    /// Add a caption text to the pool, returning the stored record.
    async fn add_text(&self, text: &str) -> ProviderResult<CaptionText>;

    /// Remove one matching caption text. Returns `false` if none matched.
    async fn delete_text(&self, text: &str) -> ProviderResult<bool>;
}
