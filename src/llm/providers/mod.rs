//! LLM provider implementations.
//!
//! `build(config)` is the factory — called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod ollama;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config.
pub fn build(config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "ollama" => {
            let o = &config.ollama;
            let p = ollama::OllamaProvider::new(
                o.api_base_url.clone(),
                o.probe_timeout_seconds,
                o.generate_timeout_seconds,
            )?;
            Ok(LlmProvider::Ollama(p))
        }
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::new())),
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
