//! Random meme generation on top of a catalog provider.
//!
//! `MemeGenerator` is the owning caller of the resolution engine: it picks
//! a random template from its provider and hands it to the engine, and it
//! exposes the provider's text management operations.

use std::sync::Arc;

use crate::engine::{CaptionEngine, EngineConfig, EngineResult};
use crate::error::{AppError, Result};
use crate::provider::MemeProvider;
use crate::template::{CaptionText, Template};

pub struct MemeGenerator<P: MemeProvider + 'static> {
    provider: Arc<P>,
    engine: CaptionEngine,
}

impl<P: MemeProvider + 'static> MemeGenerator<P> {
    /// Create a generator sharing `provider` with its engine
    pub fn new(provider: Arc<P>, config: EngineConfig) -> EngineResult<Self> {
        let engine = CaptionEngine::new(provider.clone(), config)?;
        Ok(Self { provider, engine })
    }

    /// Pick a random template and resolve it into an image URL
    pub async fn random_meme_url(&self) -> Result<String> {
        let template = self.provider.random_template().await?;
        tracing::debug!(title = %template.title, "Template selected");
        Ok(self.engine.resolve(&template).await?)
    }

    /// Resolve a caller-chosen template into an image URL
    pub async fn meme_url(&self, template: &Template) -> Result<String> {
        Ok(self.engine.resolve(template).await?)
    }

    pub async fn templates(&self) -> Result<Vec<Template>> {
        Ok(self.provider.all_templates().await?)
    }

    pub async fn texts(&self) -> Result<Vec<CaptionText>> {
        Ok(self.provider.all_texts().await?)
    }

    /// Add a caption text to the pool
    pub async fn add_text(&self, text: &str) -> Result<CaptionText> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("caption text must not be empty".to_string()));
        }
        Ok(self.provider.add_text(text).await?)
    }

    /// Remove a caption text from the pool
    pub async fn delete_text(&self, text: &str) -> Result<bool> {
        Ok(self.provider.delete_text(text).await?)
    }
}
