//! Prompt context assembly.
//!
//! One context per request: persona preamble, the full memory log (or its
//! empty marker), then the user message. Nothing is stored — the context is
//! recomputed every call.

use crate::memory::MemoryLog;

/// Built-in persona preamble, used when the config does not override it.
pub const DEFAULT_PERSONA: &str = "You are JARVIS, an advanced AI assistant. \
You are sharp, witty, professional with dry humor, \
and remember everything unless told to forget.";

/// Assemble the completion prompt for one user message.
pub fn build_context(persona: &str, memory: &MemoryLog, message: &str) -> String {
    format!("{persona}\n\nMEMORY:\n{}\n\nUSER: {message}", memory.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::EMPTY_MARKER;
    use tempfile::TempDir;

    #[test]
    fn context_layers_in_order() {
        let dir = TempDir::new().unwrap();
        let mut memory = MemoryLog::load(dir.path().join("memory.txt"));
        memory.record("the cat is orange").unwrap();

        let ctx = build_context("You are a test bot.", &memory, "what color is the cat?");

        let persona_at = ctx.find("You are a test bot.").unwrap();
        let memory_at = ctx.find("MEMORY:").unwrap();
        let user_at = ctx.find("USER: what color is the cat?").unwrap();
        assert!(persona_at < memory_at);
        assert!(memory_at < user_at);
        assert!(ctx.contains("the cat is orange"));
    }

    #[test]
    fn empty_memory_renders_marker() {
        let dir = TempDir::new().unwrap();
        let memory = MemoryLog::load(dir.path().join("memory.txt"));

        let ctx = build_context(DEFAULT_PERSONA, &memory, "hello");
        assert!(ctx.contains(EMPTY_MARKER));
    }
}
