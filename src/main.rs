use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meme_caption_engine::config::Settings;
use meme_caption_engine::engine::EngineConfig;
use meme_caption_engine::generator::MemeGenerator;
use meme_caption_engine::provider::create_provider;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!("Configuration loaded");

    // Create provider and generator
    let provider = create_provider(&settings.catalog).await?;
    tracing::info!(
        templates = provider.template_count().await,
        texts = provider.text_count().await,
        "Caption provider ready"
    );

    let config = EngineConfig::from(&settings.engine);
    let generator = MemeGenerator::new(Arc::clone(&provider), config)?;

    match generator.random_meme_url().await {
        Ok(url) => {
            println!("{}", url);
            Ok(())
        }
        Err(e) => {
            tracing::error!(code = %e.code(), error = %e, "Failed to generate meme URL");
            Err(e.into())
        }
    }
}

/// Logs go to stderr so stdout carries only the URL. `LOG_FORMAT=json`
/// switches to structured output.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
