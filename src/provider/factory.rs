//! Provider factory

use std::sync::Arc;

use crate::config::CatalogSettings;

use super::backend::ProviderResult;
use super::memory::MemoryMemeProvider;

/// Create the caption provider described by the catalog settings.
///
/// - `path` set: the JSON catalog is loaded into a `MemoryMemeProvider`
/// - `path` unset: an empty `MemoryMemeProvider` is returned
///
/// # Example
///
/// ```rust,ignore
/// let provider = create_provider(&settings.catalog).await?;
/// ```
pub async fn create_provider(
    settings: &CatalogSettings,
) -> ProviderResult<Arc<MemoryMemeProvider>> {
    match settings.path.as_deref() {
        Some(path) => {
            tracing::info!(backend = "memory", path = %path, "Loading caption catalog");
            Ok(Arc::new(MemoryMemeProvider::from_catalog_file(path).await?))
        }
        None => {
            tracing::warn!("No caption catalog configured, starting with an empty provider");
            Ok(Arc::new(MemoryMemeProvider::new()))
        }
    }
}
