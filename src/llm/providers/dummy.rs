//! Dummy LLM provider — echoes input back prefixed with `[echo:{model}]`.
//! Used for testing the full dispatch round-trip without a live server.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider {
    models: Vec<String>,
    behavior: Behavior,
}

#[derive(Debug, Clone)]
enum Behavior {
    Echo,
    HttpError(u16),
    Unreachable,
}

impl DummyProvider {
    /// Well-behaved provider serving one model named `"dummy"`.
    pub fn new() -> Self {
        Self { models: vec!["dummy".to_string()], behavior: Behavior::Echo }
    }

    /// Well-behaved provider serving the given model names.
    pub fn with_models(models: Vec<String>) -> Self {
        Self { models, behavior: Behavior::Echo }
    }

    /// Reachable provider whose completions fail with the given HTTP status.
    pub fn failing_http(status: u16) -> Self {
        Self { models: vec!["dummy".to_string()], behavior: Behavior::HttpError(status) }
    }

    /// Provider whose every call fails at the transport level.
    pub fn unreachable() -> Self {
        Self { models: Vec::new(), behavior: Behavior::Unreachable }
    }

    pub async fn ping(&self) -> Result<String, ProviderError> {
        match self.behavior {
            Behavior::Unreachable => Err(ProviderError::Request("unreachable (dummy)".into())),
            _ => Ok("dummy-0".to_string()),
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        match self.behavior {
            Behavior::Unreachable => Err(ProviderError::Request("unreachable (dummy)".into())),
            _ => Ok(self.models.clone()),
        }
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        match self.behavior {
            Behavior::Echo => Ok(format!("[echo:{model}] {prompt}")),
            Behavior::HttpError(status) => Err(ProviderError::Http {
                status,
                message: "dummy upstream error".into(),
            }),
            Behavior::Unreachable => Err(ProviderError::Request("unreachable (dummy)".into())),
        }
    }
}

impl Default for DummyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_echoes_model_and_prompt() {
        let p = DummyProvider::new();
        assert_eq!(p.generate("dummy", "hello").await.unwrap(), "[echo:dummy] hello");
    }

    #[tokio::test]
    async fn failing_http_surfaces_status() {
        let p = DummyProvider::failing_http(500);
        match p.generate("dummy", "hello").await {
            Err(ProviderError::Http { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_fails_every_call() {
        let p = DummyProvider::unreachable();
        assert!(p.ping().await.is_err());
        assert!(p.list_models().await.is_err());
        assert!(p.generate("dummy", "hello").await.is_err());
    }
}
