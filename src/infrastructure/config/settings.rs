use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Resolve wildcard markers found inside fetched caption texts
    #[serde(default = "default_text_wildcards_allowed")]
    pub text_wildcards_allowed: bool,
    /// Marker used inside template lines
    #[serde(default = "default_wildcard")]
    pub template_wildcard: String,
    /// Markers recognised inside caption texts (a single string or a list)
    #[serde(
        default = "default_text_wildcard",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub text_wildcard: Vec<String>,
    /// Base URL of the image generation API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Full resolution attempts before giving up on an over-long result
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Maximum length of the `/`-joined caption lines
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Provider fetches allowed while expanding a single caption text
    #[serde(default = "default_max_expansion_rounds")]
    pub max_expansion_rounds: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// JSON catalog with templates and caption texts
    pub path: Option<String>,
}

fn default_text_wildcards_allowed() -> bool {
    true
}

fn default_wildcard() -> String {
    "*".to_string()
}

fn default_text_wildcard() -> Vec<String> {
    vec![default_wildcard()]
}

fn default_api_url() -> String {
    "https://api.memegen.link".to_string()
}

fn default_max_attempts() -> u32 {
    100
}

fn default_max_length() -> usize {
    200
}

fn default_max_expansion_rounds() -> u32 {
    50
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(marker) => vec![marker],
        OneOrMany::Many(markers) => markers,
    })
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("engine.text_wildcards_allowed", true)?
            .set_default("engine.template_wildcard", "*")?
            .set_default("engine.text_wildcard", vec!["*"])?
            .set_default("engine.api_url", "https://api.memegen.link")?
            .set_default("engine.max_attempts", 100)?
            .set_default("engine.max_length", 200)?
            .set_default("engine.max_expansion_rounds", 50)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // MEME__ENGINE__API_URL, MEME__ENGINE__TEXT_WILDCARD=*,+, MEME__CATALOG__PATH, etc.
            .add_source(
                Environment::with_prefix("MEME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("engine.text_wildcard"),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            text_wildcards_allowed: default_text_wildcards_allowed(),
            template_wildcard: default_wildcard(),
            text_wildcard: default_text_wildcard(),
            api_url: default_api_url(),
            max_attempts: default_max_attempts(),
            max_length: default_max_length(),
            max_expansion_rounds: default_max_expansion_rounds(),
        }
    }
}
