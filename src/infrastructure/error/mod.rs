use thiserror::Error;

use crate::engine::EngineError;
use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Validation error: {0}")]
    Validation(String),

}

impl AppError {
    /// Stable error code for logs and callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Provider(ProviderError::EmptyPool)
            | AppError::Provider(ProviderError::NotFound(_)) => "NOT_FOUND",
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::Engine(EngineError::Provider(_)) => "PROVIDER_ERROR",
            AppError::Engine(EngineError::TemplateTooLong { .. }) => "TEMPLATE_TOO_LONG",
            AppError::Engine(_) => "TEMPLATE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
