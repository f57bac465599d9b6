mod settings;

pub use settings::{CatalogSettings, EngineSettings, Settings};
