//! Caption template resolution engine.
//!
//! This module provides:
//! - Slot counting over template lines
//! - Recursive expansion of wildcards embedded in caption texts
//! - Distribution of resolved texts into template lines (including `*_N`
//!   indexed references)
//! - A length-bounded retry loop around the whole pipeline
//! - Encoding of the finished lines into an image API URL
//!
//! # Example
//!
//! ```ignore
//! let engine = CaptionEngine::new(provider, EngineConfig::default())?;
//!
//! let template = Template {
//!     title: "Do you want ants?".to_string(),
//!     url_prefix: "ants".to_string(),
//!     custom_image: None,
//!     lines: vec!["Do you want *?".to_string(), "because that's how you get *".to_string()],
//! };
//!
//! // https://api.memegen.link/images/ants/Do_you_want_Bears~q/because_that's_how_you_get_Rats.png
//! let url = engine.resolve(&template).await?;
//! ```

mod distribution;
mod encoding;
mod expansion;
mod slots;

use std::sync::Arc;

use futures::future::try_join_all;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::EngineSettings;
use crate::provider::{ProviderError, TextProvider};
use crate::template::Template;

pub use distribution::{distribute, MAX_SUBSTITUTIONS_PER_LINE};
pub use encoding::{build_image_url, joined_length, sanitize_for_url};
pub use expansion::{expand_text, TextWildcard};
pub use slots::count_slots;

/// Engine-specific error type
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Indexed wildcard refers to index {index} but only {available} texts were drawn")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("No resolution within {max_length} characters after {attempts} attempts")]
    TemplateTooLong { attempts: u32, max_length: usize },

    #[error("Text wildcards still unresolved after {rounds} expansion rounds")]
    ExpansionLimit { rounds: u32 },

    #[error("Provider returned no text for a wildcard expansion")]
    ProviderShortfall,

    #[error("Invalid wildcard: {0}")]
    InvalidWildcard(String),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(#[from] url::ParseError),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Configuration for the resolution engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether wildcards inside caption texts are expanded
    pub text_wildcards_allowed: bool,
    /// Marker used in template lines
    pub template_wildcard: String,
    /// Markers recognised inside caption texts, in resolution order
    pub text_wildcards: Vec<String>,
    /// Base URL of the image API
    pub api_url: String,
    /// Full resolution attempts before giving up
    pub max_attempts: u32,
    /// Maximum length of the `/`-joined lines
    pub max_length: usize,
    /// Provider fetches allowed while expanding one caption text
    pub max_expansion_rounds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&EngineSettings::default())
    }
}

impl From<&EngineSettings> for EngineConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            text_wildcards_allowed: settings.text_wildcards_allowed,
            template_wildcard: settings.template_wildcard.clone(),
            text_wildcards: settings.text_wildcard.clone(),
            api_url: settings.api_url.clone(),
            max_attempts: settings.max_attempts,
            max_length: settings.max_length,
            max_expansion_rounds: settings.max_expansion_rounds,
        }
    }
}

/// Resolves caption templates into image URLs.
///
/// Stateless apart from its configuration; one engine can serve any number
/// of concurrent resolutions.
pub struct CaptionEngine {
    provider: Arc<dyn TextProvider>,
    config: EngineConfig,
    api_url: Url,
    template_pattern: Regex,
    text_wildcards: Vec<TextWildcard>,
}

impl std::fmt::Debug for CaptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CaptionEngine {
    /// Create an engine, validating the configuration
    pub fn new(provider: Arc<dyn TextProvider>, config: EngineConfig) -> EngineResult<Self> {
        if config.template_wildcard.is_empty() {
            return Err(EngineError::InvalidWildcard(
                "template wildcard must not be empty".to_string(),
            ));
        }
        if config.max_attempts == 0 {
            return Err(EngineError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(EngineError::InvalidConfig(format!(
                "api_url cannot carry a path: {}",
                config.api_url
            )));
        }
        let template_pattern = slots::literal_pattern(&config.template_wildcard)
            .map_err(|e| EngineError::InvalidWildcard(e.to_string()))?;
        let text_wildcards = config
            .text_wildcards
            .iter()
            .map(|marker| TextWildcard::new(marker))
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            provider,
            config,
            api_url,
            template_pattern,
            text_wildcards,
        })
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of caption texts `template` draws per attempt
    pub fn slot_count(&self, template: &Template) -> usize {
        count_slots(&template.lines, &self.template_pattern)
    }

    /// Resolve a template into a finished image URL.
    ///
    /// Each attempt draws a fresh batch of texts. An attempt whose lines
    /// exceed `max_length` is discarded whole.
    #[tracing::instrument(
        name = "engine.resolve",
        skip(self, template),
        fields(url_prefix = %template.url_prefix, lines = template.lines.len())
    )]
    pub async fn resolve(&self, template: &Template) -> EngineResult<String> {
        let lines = self.resolve_lines(template).await?;
        Ok(build_image_url(&self.api_url, &lines, template))
    }

    /// Resolve a template into its finished (unsanitized) caption lines.
    pub async fn resolve_lines(&self, template: &Template) -> EngineResult<Vec<String>> {
        let count = self.slot_count(template);

        for attempt in 1..=self.config.max_attempts {
            let texts = self.provider.random_texts(count).await?;
            let texts = self
                .expand_all(texts.into_iter().map(|t| t.text).collect())
                .await?;
            let lines = distribute(&template.lines, &texts, &self.config.template_wildcard)?;

            let length = joined_length(&lines);
            tracing::debug!(
                attempt = attempt,
                count = count,
                length = length,
                "Resolution attempt"
            );

            if length <= self.config.max_length {
                return Ok(lines);
            }

            tracing::warn!(
                attempt = attempt,
                length = length,
                max_length = self.config.max_length,
                "Resolved captions too long, drawing new texts"
            );
        }

        Err(EngineError::TemplateTooLong {
            attempts: self.config.max_attempts,
            max_length: self.config.max_length,
        })
    }

    /// Expand every text independently and concurrently.
    async fn expand_all(&self, texts: Vec<String>) -> EngineResult<Vec<String>> {
        if !self.config.text_wildcards_allowed || self.text_wildcards.is_empty() {
            return Ok(texts);
        }

        try_join_all(texts.into_iter().map(|text| {
            expand_text(
                self.provider.as_ref(),
                &self.text_wildcards,
                text,
                self.config.max_expansion_rounds,
            )
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::provider::ProviderResult;
    use crate::template::CaptionText;

    const API_URL: &str = "https://api.memegen.link";

    /// Replays scripted batches, repeating the last one, and records counts
    struct ScriptedProvider {
        batches: Mutex<VecDeque<Vec<&'static str>>>,
        last: Mutex<Option<Vec<&'static str>>>,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn new(batches: Vec<Vec<&'static str>>) -> Arc<Self> {
            Arc::new(Self {
                batches: Mutex::new(batches.into()),
                last: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        async fn random_texts(&self, count: usize) -> ProviderResult<Vec<CaptionText>> {
            self.calls.lock().unwrap().push(count);

            let next = self.batches.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(batch) = next {
                *last = Some(batch);
            }
            match last.as_ref() {
                Some(batch) => Ok(batch.iter().map(|t| CaptionText::new(*t)).collect()),
                None => Err(ProviderError::Backend("no batches scripted".to_string())),
            }
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            text_wildcards_allowed: true,
            template_wildcard: "*".to_string(),
            text_wildcards: vec!["*".to_string(), "+".to_string()],
            api_url: API_URL.to_string(),
            max_attempts: 5,
            max_length: 200,
            max_expansion_rounds: 10,
        }
    }

    fn engine(provider: Arc<ScriptedProvider>) -> CaptionEngine {
        CaptionEngine::new(provider, test_config()).unwrap()
    }

    fn template(prefix: &str, lines: &[&str]) -> Template {
        Template {
            title: prefix.to_string(),
            url_prefix: prefix.to_string(),
            custom_image: None,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_blank_template_lines_are_filled() {
        let provider = ScriptedProvider::new(vec![vec!["Alden Sucks"]]);
        let url = engine(provider.clone())
            .resolve(&template("cmm", &[""]))
            .await
            .unwrap();

        assert_eq!(url, format!("{}/images/cmm/Alden_Sucks.png", API_URL));
        assert_eq!(provider.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_template_wildcards_are_filled() {
        let provider = ScriptedProvider::new(vec![vec!["Bears", "Rats"]]);
        let ants = template("ants", &["Do you want *?", "because that's how you get *"]);
        let url = engine(provider.clone()).resolve(&ants).await.unwrap();

        assert_eq!(
            url,
            format!(
                "{}/images/ants/Do_you_want_Bears~q/because_that's_how_you_get_Rats.png",
                API_URL
            )
        );
        assert_eq!(provider.calls(), vec![2]);
    }

    #[tokio::test]
    async fn test_custom_image_template() {
        let provider = ScriptedProvider::new(vec![vec!["Phoetograph"]]);
        let mut custom = template("", &[" ", ""]);
        custom.custom_image = Some("https://example.com/bhotm/Oct20Kai.jpg".to_string());

        let url = engine(provider.clone()).resolve(&custom).await.unwrap();

        assert_eq!(
            url,
            format!(
                "{}/images/custom/_/Phoetograph.png?background=https://example.com/bhotm/Oct20Kai.jpg",
                API_URL
            )
        );
        assert_eq!(provider.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_indexed_wildcards() {
        let provider = ScriptedProvider::new(vec![vec!["Kai", "Alden", "Frog", "X"]]);
        let gru = template("gru", &["", "", "", "*_2"]);
        let url = engine(provider.clone()).resolve(&gru).await.unwrap();

        assert_eq!(url, format!("{}/images/gru/Kai/Alden/Frog/Frog.png", API_URL));
        assert_eq!(provider.calls(), vec![4]);
    }

    #[tokio::test]
    async fn test_over_length_result_is_redrawn() {
        let long_a: &'static str = Box::leak("A".repeat(110).into_boxed_str());
        let long_b: &'static str = Box::leak("B".repeat(123).into_boxed_str());
        let provider = ScriptedProvider::new(vec![vec![long_a, long_b], vec!["Bears", "Rats"]]);
        let ants = template("ants", &["Do you want *?", "because that's how you get *"]);

        let url = engine(provider.clone()).resolve(&ants).await.unwrap();

        assert_eq!(
            url,
            format!(
                "{}/images/ants/Do_you_want_Bears~q/because_that's_how_you_get_Rats.png",
                API_URL
            )
        );
        assert_eq!(provider.calls(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_always_too_long_gives_up() {
        let long: &'static str = Box::leak("Z".repeat(250).into_boxed_str());
        let provider = ScriptedProvider::new(vec![vec![long]]);

        let result = engine(provider.clone()).resolve(&template("cmm", &[""])).await;

        assert!(matches!(
            result,
            Err(EngineError::TemplateTooLong { attempts: 5, max_length: 200 })
        ));
        assert_eq!(provider.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_wildcards_within_text() {
        let provider = ScriptedProvider::new(vec![vec!["Hello *", "Howdy"], vec!["Alden"]]);
        let url = engine(provider.clone())
            .resolve(&template("drake", &["", ""]))
            .await
            .unwrap();

        assert_eq!(url, format!("{}/images/drake/Hello_Alden/Howdy.png", API_URL));
        assert_eq!(provider.calls(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_nested_wildcards_within_text() {
        let provider = ScriptedProvider::new(vec![
            vec!["H*", "Howdy"],
            vec!["ald* + +"],
            vec!["or"],
            vec!["frog"],
        ]);
        let url = engine(provider.clone())
            .resolve(&template("drake", &["", ""]))
            .await
            .unwrap();

        assert_eq!(url, format!("{}/images/drake/Haldor_frog_frog/Howdy.png", API_URL));
        assert_eq!(provider.calls(), vec![2, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_text_wildcards_disabled() {
        let provider = ScriptedProvider::new(vec![vec!["Hello *", "Howdy"]]);
        let config = EngineConfig {
            text_wildcards_allowed: false,
            ..test_config()
        };
        let engine = CaptionEngine::new(provider.clone(), config).unwrap();

        let lines = engine
            .resolve_lines(&template("drake", &["", ""]))
            .await
            .unwrap();

        assert_eq!(lines, vec!["Hello *", "Howdy"]);
        assert_eq!(provider.calls(), vec![2]);
    }

    #[tokio::test]
    async fn test_provider_error_propagates_without_retry() {
        let provider = ScriptedProvider::new(vec![]);
        let result = engine(provider.clone()).resolve(&template("cmm", &[""])).await;

        assert!(matches!(
            result,
            Err(EngineError::Provider(ProviderError::Backend(_)))
        ));
        assert_eq!(provider.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_short_initial_batch_degrades() {
        let provider = ScriptedProvider::new(vec![vec!["only"]]);
        let lines = engine(provider.clone())
            .resolve_lines(&template("x", &["", "", "* and *"]))
            .await
            .unwrap();

        assert_eq!(lines, vec!["only", " ", "* and *"]);
        assert_eq!(provider.calls(), vec![4]);
    }

    #[tokio::test]
    async fn test_empty_expansion_fetch_is_a_shortfall() {
        let provider = ScriptedProvider::new(vec![vec!["a *", "a *"], vec![]]);
        let result = engine(provider.clone())
            .resolve(&template("drake", &["", ""]))
            .await;

        assert!(matches!(result, Err(EngineError::ProviderShortfall)));
        assert_eq!(provider.calls()[0], 2);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_an_error() {
        let provider = ScriptedProvider::new(vec![vec!["only"]]);
        let result = engine(provider).resolve(&template("gru", &["*_3"])).await;

        assert!(matches!(
            result,
            Err(EngineError::IndexOutOfRange { index: 3, available: 1 })
        ));
    }

    #[tokio::test]
    async fn test_template_marker_metacharacter() {
        let provider = ScriptedProvider::new(vec![vec!["cats", "dogs"]]);
        let config = EngineConfig {
            template_wildcard: "+".to_string(),
            text_wildcards: vec!["#".to_string()],
            ..test_config()
        };
        let engine = CaptionEngine::new(provider.clone(), config).unwrap();

        let lines = engine
            .resolve_lines(&template("x", &["+ * +"]))
            .await
            .unwrap();

        assert_eq!(lines, vec!["cats * dogs"]);
        assert_eq!(provider.calls(), vec![2]);
    }

    #[test]
    fn test_slot_count() {
        let provider = ScriptedProvider::new(vec![]);
        let engine = engine(provider);
        assert_eq!(engine.slot_count(&template("gru", &["", "", "", "*_2"])), 4);
        assert_eq!(engine.slot_count(&template("x", &["* and *", ""])), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let provider: Arc<dyn TextProvider> = ScriptedProvider::new(vec![]);

        let empty_marker = EngineConfig {
            template_wildcard: String::new(),
            ..test_config()
        };
        assert_err!(CaptionEngine::new(provider.clone(), empty_marker));

        let no_attempts = EngineConfig {
            max_attempts: 0,
            ..test_config()
        };
        assert_err!(CaptionEngine::new(provider.clone(), no_attempts));

        let bad_url = EngineConfig {
            api_url: "not a url".to_string(),
            ..test_config()
        };
        assert!(matches!(
            CaptionEngine::new(provider.clone(), bad_url),
            Err(EngineError::InvalidApiUrl(_))
        ));

        let no_base = EngineConfig {
            api_url: "mailto:x@y".to_string(),
            ..test_config()
        };
        assert!(matches!(
            CaptionEngine::new(provider.clone(), no_base),
            Err(EngineError::InvalidConfig(_))
        ));

        assert_ok!(CaptionEngine::new(provider, EngineConfig::default()));
    }
}
