//! In-memory caption provider.
//!
//! Templates and texts live behind `RwLock`s and are lost on restart. The
//! pool can be seeded from a JSON catalog file.

use std::path::Path;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tokio::sync::RwLock;

use crate::template::{CaptionText, Catalog, Template};

use super::backend::{MemeProvider, ProviderError, ProviderResult, TextProvider};

/// In-memory template and text store.
#[derive(Debug, Default)]
pub struct MemoryMemeProvider {
    templates: RwLock<Vec<Template>>,
    texts: RwLock<Vec<CaptionText>>,
}

impl MemoryMemeProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider seeded with the given templates and texts
    pub fn with_contents(templates: Vec<Template>, texts: Vec<CaptionText>) -> Self {
        Self {
            templates: RwLock::new(templates),
            texts: RwLock::new(texts),
        }
    }

    /// Create a provider from a parsed catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        let texts = catalog.texts.into_iter().map(CaptionText::from).collect();
        Self::with_contents(catalog.templates, texts)
    }

    /// Load a JSON catalog file
    pub async fn from_catalog_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let catalog: Catalog = serde_json::from_str(&raw)?;

        tracing::debug!(
            path = %path.as_ref().display(),
            templates = catalog.templates.len(),
            texts = catalog.texts.len(),
            "Loaded caption catalog"
        );

        Ok(Self::from_catalog(catalog))
    }

    /// Number of texts in the pool
    pub async fn text_count(&self) -> usize {
        self.texts.read().await.len()
    }

    /// Number of templates
    pub async fn template_count(&self) -> usize {
        self.templates.read().await.len()
    }
}

/// Sample `count` items: without replacement while the pool lasts, then
/// with replacement so the result always has exactly `count` entries.
fn sample_exact<T: Clone>(pool: &[T], count: usize) -> Vec<T> {
    let mut rng = rand::rng();
    let mut picked: Vec<T> = pool.choose_multiple(&mut rng, count).cloned().collect();

    while picked.len() < count {
        match pool.choose(&mut rng) {
            Some(item) => picked.push(item.clone()),
            None => break,
        }
    }

    picked
}

#[async_trait]
impl TextProvider for MemoryMemeProvider {
    async fn random_texts(&self, count: usize) -> ProviderResult<Vec<CaptionText>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let texts = self.texts.read().await;
        if texts.is_empty() {
            return Err(ProviderError::EmptyPool);
        }

        Ok(sample_exact(texts.as_slice(), count))
    }
}

#[async_trait]
impl MemeProvider for MemoryMemeProvider {
    async fn random_template(&self) -> ProviderResult<Template> {
        let templates = self.templates.read().await;
        let mut rng = rand::rng();
        templates
            .choose(&mut rng)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound("no templates available".to_string()))
    }

    async fn all_templates(&self) -> ProviderResult<Vec<Template>> {
        Ok(self.templates.read().await.clone())
    }

    async fn all_texts(&self) -> ProviderResult<Vec<CaptionText>> {
        Ok(self.texts.read().await.clone())
    }

    async fn add_text(&self, text: &str) -> ProviderResult<CaptionText> {
        let record = CaptionText::new(text);
        self.texts.write().await.push(record.clone());

        tracing::debug!(text = %text, "Caption text added");
        Ok(record)
    }

    async fn delete_text(&self, text: &str) -> ProviderResult<bool> {
        let mut texts = self.texts.write().await;
        match texts.iter().position(|t| t.text == text) {
            Some(index) => {
                texts.remove(index);
                tracing::debug!(text = %text, "Caption text deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
