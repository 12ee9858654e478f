//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Async is delegated to the underlying provider; the methods are `async fn`
//! on the enum so callers need no trait-object machinery.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new match arms.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Ollama(providers::ollama::OllamaProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Probe whether the inference runtime is reachable.
    ///
    /// Returns the runtime's version string on success. Only transport-level
    /// failures (connection refused, timeout) error.
    pub async fn ping(&self) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.ping().await,
            LlmProvider::Dummy(p) => p.ping().await,
        }
    }

    /// Fetch the names of the models the runtime currently serves.
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.list_models().await,
            LlmProvider::Dummy(p) => p.list_models().await,
        }
    }

    /// Send `prompt` to `model` and return the completion text.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Ollama(p) => p.generate(model, prompt).await,
            LlmProvider::Dummy(p) => p.generate(model, prompt).await,
        }
    }
}
