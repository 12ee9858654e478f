//! Ollama native-API provider (`/api/version`, `/api/tags`, `/api/generate`).
//!
//! All Ollama wire types are private to this module — callers never see
//! them. One completion is one blocking round-trip: no retries, no
//! streaming; prompt assembly belongs at the gateway layer.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for a local Ollama server.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally. The probe ceiling applies to
/// the availability check and model listing; the generate ceiling to
/// completion round-trips.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    api_base_url: String,
    probe_timeout: Duration,
}

impl OllamaProvider {
    /// Build a provider from config values.
    pub fn new(
        api_base_url: String,
        probe_timeout_seconds: u64,
        generate_timeout_seconds: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(generate_timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url,
            probe_timeout: Duration::from_secs(probe_timeout_seconds),
        })
    }

    /// Lightweight reachability probe against `/api/version`.
    ///
    /// Any HTTP response (including 4xx) means the server is reachable; only
    /// a transport-level failure (connection refused, timeout) is treated as
    /// unreachable. Returns the reported version string when the body parses,
    /// `"unknown"` otherwise.
    pub async fn ping(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("unreachable: {e}")))?;

        let version = match response.json::<VersionResponse>().await {
            Ok(v) => v.version,
            Err(_) => "unknown".to_string(),
        };
        debug!(%version, "inference runtime reachable");
        Ok(version)
    }

    /// Fetch model names from `/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "model listing failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<TagsResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize model listing");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Send `prompt` to `model` via `/api/generate` and return the
    /// completion text.
    ///
    /// A response with no `response` field yields the fixed `"No output."`
    /// placeholder rather than an error.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let payload = GenerateRequest { model, prompt, stream: false };

        debug!(%model, prompt_len = prompt.len(), "sending generate request");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full generate payload");
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let response = self.client.post(&url).json(&payload).send().await.map_err(|e| {
            error!(%url, error = %e, "generate request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize completion");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        Ok(parsed.response.unwrap_or_else(|| "No output.".to_string()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

// Error envelope used by the Ollama API.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Consume the response and return it if successful, or a structured error
/// carrying the status code.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        env.error
    } else {
        body.trim().to_string()
    };

    error!(%status, %message, "inference request returned HTTP error");
    Err(ProviderError::Http { status: status.as_u16(), message })
}
