//! Expansion of wildcard markers embedded in caption texts.

use regex::{NoExpand, Regex};

use crate::provider::TextProvider;

use super::slots::literal_pattern;
use super::{EngineError, EngineResult};

/// A text-side wildcard marker and its literal-match pattern
#[derive(Debug, Clone)]
pub struct TextWildcard {
    marker: String,
    pattern: Regex,
}

impl TextWildcard {
    pub fn new(marker: &str) -> EngineResult<Self> {
        if marker.is_empty() {
            return Err(EngineError::InvalidWildcard(
                "text wildcard must not be empty".to_string(),
            ));
        }
        let pattern =
            literal_pattern(marker).map_err(|e| EngineError::InvalidWildcard(e.to_string()))?;
        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }
}

/// Resolve every text wildcard in `text`.
///
/// Each round fetches one text and substitutes it for all occurrences of
/// the first configured marker still present. Rounds continue until no
/// marker remains or `max_rounds` fetches have been spent.
pub async fn expand_text(
    provider: &dyn TextProvider,
    wildcards: &[TextWildcard],
    mut text: String,
    max_rounds: u32,
) -> EngineResult<String> {
    let mut rounds = 0;

    while let Some(wildcard) = wildcards.iter().find(|w| w.pattern.is_match(&text)) {
        if rounds >= max_rounds {
            return Err(EngineError::ExpansionLimit { rounds });
        }
        rounds += 1;

        let filler = provider
            .random_texts(1)
            .await?
            .into_iter()
            .next()
            .ok_or(EngineError::ProviderShortfall)?;

        tracing::trace!(
            marker = %wildcard.marker,
            round = rounds,
            filler = %filler.text,
            "Expanding text wildcard"
        );

        text = wildcard
            .pattern
            .replace_all(&text, NoExpand(&filler.text))
            .into_owned();
    }

    Ok(text)
}
