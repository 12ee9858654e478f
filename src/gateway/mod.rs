//! Assistant gateway — the owned state object behind the supervisor loop.
//!
//! Holds everything process-wide: the inference availability flag, the
//! transient model registry with its active selection, and the persisted
//! memory log. Channels never touch this directly; every inbound message
//! arrives through the supervisor bus and is handled by [`Gateway::dispatch`]
//! start-to-finish.
//!
//! Every external-call failure is caught here and converted to a short
//! user-facing reply string; nothing propagates as a crash.

pub mod command;
pub mod prompt;

use tracing::{error, info, warn};

use crate::llm::{LlmProvider, ProviderError};
use crate::memory::MemoryLog;
use command::Command;

/// Fixed reply when the runtime is down or no model is active.
pub const NOT_CONFIGURED: &str = "❌ Ollama not configured or no model active.";

/// Matched case-insensitively anywhere in a free-text message.
const TRIGGER_PHRASE: &str = "remember this:";

const HELP_TEXT: &str = "🤖 JARVIS at your service\n\n\
Commands:\n\
• /status – Check bot + model state\n\
• /models – List models\n\
• /model <name> – Change model\n\
• /memory – View memories\n\
• /forget – Erase all memories\n\n\
Say \"remember this: ...\" to store facts.";

pub struct Gateway {
    provider: LlmProvider,
    persona: String,
    memory: MemoryLog,
    runtime_ready: bool,
    models: Vec<String>,
    active_model: Option<String>,
}

impl Gateway {
    pub fn new(provider: LlmProvider, persona: String, memory: MemoryLog) -> Self {
        Self {
            provider,
            persona,
            memory,
            runtime_ready: false,
            models: Vec::new(),
            active_model: None,
        }
    }

    pub fn runtime_ready(&self) -> bool {
        self.runtime_ready
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    pub fn memory(&self) -> &MemoryLog {
        &self.memory
    }

    /// Startup sequence: probe the runtime and, when reachable, populate the
    /// model registry. Failures are logged and leave the gateway unavailable.
    pub async fn startup_probe(&mut self) {
        if self.check_runtime().await {
            self.refresh_models().await;
        }
    }

    /// Re-evaluate inference availability. Never fatal.
    pub async fn check_runtime(&mut self) -> bool {
        match self.provider.ping().await {
            Ok(version) => {
                info!(%version, "inference runtime available");
                self.runtime_ready = true;
            }
            Err(e) => {
                warn!(error = %e, "inference runtime unavailable");
                self.runtime_ready = false;
            }
        }
        self.runtime_ready
    }

    /// Replace the model registry from the runtime. On success the active
    /// model resets to the first entry (when non-empty); on failure the
    /// prior registry and selection stay untouched.
    pub async fn refresh_models(&mut self) -> bool {
        match self.provider.list_models().await {
            Ok(models) => {
                self.models = models;
                if let Some(first) = self.models.first() {
                    self.active_model = Some(first.clone());
                }
                info!(count = self.models.len(), active = ?self.active_model, "model registry refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not fetch models — keeping prior registry");
                false
            }
        }
    }

    /// One completion round-trip with the memory log injected.
    ///
    /// `model_override` is honored only when the name is present in the
    /// registry; otherwise generation silently falls back to the active
    /// model. The memory log is never mutated here.
    pub async fn generate(&self, message: &str, model_override: Option<&str>) -> String {
        let Some(active) = self.active_model.as_deref() else {
            return NOT_CONFIGURED.to_string();
        };
        if !self.runtime_ready {
            return NOT_CONFIGURED.to_string();
        }

        let model = model_override
            .filter(|m| self.models.iter().any(|known| known == m))
            .unwrap_or(active);

        let context = prompt::build_context(&self.persona, &self.memory, message);

        match self.provider.generate(model, &context).await {
            Ok(text) => text,
            Err(ProviderError::Http { status, .. }) => format!("❌ API error {status}"),
            Err(e) => format!("❌ Failed to connect: {e}"),
        }
    }

    /// Handle one inbound message start-to-finish and return the reply.
    pub async fn dispatch(&mut self, text: &str) -> String {
        match Command::parse(text) {
            Command::Help => HELP_TEXT.to_string(),
            Command::Status => self.status().await,
            Command::Memories => self.list_memories(),
            Command::Forget => self.forget(),
            Command::Models => self.models_reply().await,
            Command::SetModel(name) => self.set_model(name),
            Command::Chat(message) => match extract_note(message) {
                Some(note) => self.remember(note),
                None => self.generate(message, None).await,
            },
        }
    }

    async fn status(&mut self) -> String {
        self.check_runtime().await;
        if self.runtime_ready {
            self.refresh_models().await;
        }

        format!(
            "🔎 Status\nOllama: {}\nModels: {}\nActive: {}\nMemories: {}",
            if self.runtime_ready { "✅" } else { "❌" },
            self.models.len(),
            self.active_model.as_deref().unwrap_or("None"),
            self.memory.len(),
        )
    }

    fn list_memories(&self) -> String {
        if self.memory.is_empty() {
            "🧠 Nothing remembered yet.".to_string()
        } else {
            format!("🧠 Memories:\n\n{}", self.memory.render())
        }
    }

    fn forget(&mut self) -> String {
        match self.memory.wipe() {
            Ok(()) => "🧠 Memory wiped clean.".to_string(),
            Err(e) => {
                error!(error = %e, "memory wipe failed");
                "❌ Could not wipe memory.".to_string()
            }
        }
    }

    fn remember(&mut self, note: &str) -> String {
        match self.memory.record(note) {
            Ok(()) => "🧠 Logged.".to_string(),
            Err(e) => {
                error!(error = %e, "memory save failed");
                "❌ Could not save that memory.".to_string()
            }
        }
    }

    async fn models_reply(&mut self) -> String {
        self.refresh_models().await;
        if self.models.is_empty() {
            return "❌ No models available.".to_string();
        }

        let mut out = String::from("📦 Models:\n");
        for name in &self.models {
            if self.active_model.as_deref() == Some(name) {
                out.push_str(&format!("• {name} (active)\n"));
            } else {
                out.push_str(&format!("• {name}\n"));
            }
        }
        out.trim_end().to_string()
    }

    fn set_model(&mut self, name: &str) -> String {
        if name.is_empty() {
            return "Usage: /model <name>".to_string();
        }
        if self.models.iter().any(|known| known == name) {
            self.active_model = Some(name.to_string());
            format!("✅ Active model: {name}")
        } else {
            format!("❌ Unknown model: {name}")
        }
    }
}

/// Find the trigger phrase case-insensitively and return the trailing note,
/// or `None` when the phrase is absent or the note is empty.
fn extract_note(text: &str) -> Option<&str> {
    let needle = TRIGGER_PHRASE.as_bytes();
    let pos = text
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))?;
    // The matched window is pure ASCII, so this slice lands on a char boundary.
    let note = text[pos + needle.len()..].trim();
    (!note.is_empty()).then_some(note)
}
