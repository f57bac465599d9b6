// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;

// Domain layer
pub mod template;
pub mod provider;

// Resolution engine
pub mod engine;

// Application layer
pub mod generator;
