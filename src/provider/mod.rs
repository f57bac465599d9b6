//! Caption text and template providers.
//!
//! This module provides:
//! - `TextProvider`: the single capability the resolution engine consumes
//! - `MemeProvider`: catalog operations used by the owning caller
//! - `MemoryMemeProvider`: in-process implementation seeded from JSON

mod backend;
mod factory;
mod memory;

pub use backend::{MemeProvider, ProviderError, ProviderResult, TextProvider};
pub use factory::create_provider;
pub use memory::MemoryMemeProvider;
