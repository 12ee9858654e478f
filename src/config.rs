//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `JARVIS_WORK_DIR` and `JARVIS_LOG_LEVEL` env overrides.
//! Secrets never live in TOML: the Telegram bot token is read from the
//! `TELEGRAM_BOT_TOKEN` env var only.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Whether the PTY channel is explicitly enabled.
    pub enabled: bool,
}

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel is explicitly enabled.
    pub enabled: bool,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub telegram: TelegramConfig,
}

/// Ollama backend configuration. Populated from `[llm.ollama]` in the TOML.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the inference server, without a trailing slash.
    pub api_base_url: String,
    /// Ceiling for the availability probe and model listing, in seconds.
    pub probe_timeout_seconds: u64,
    /// Ceiling for one completion round-trip, in seconds.
    pub generate_timeout_seconds: u64,
}

/// LLM layer configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (e.g. `"ollama"`, `"dummy"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    /// Config for the Ollama backend (`[llm.ollama]`).
    pub ollama: OllamaConfig,
}

/// Fully-resolved gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Working directory for all persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Persona preamble override; the gateway falls back to its built-in one.
    pub persona: Option<String>,
    pub comms: CommsConfig,
    pub llm: LlmConfig,
    /// Memory log file name, resolved under `work_dir`.
    pub memory_file: String,
    /// Bot token from `TELEGRAM_BOT_TOKEN` env var. Never sourced from TOML.
    pub telegram_token: Option<String>,
}

impl Config {
    /// Returns `true` if the PTY channel should be loaded.
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    /// Returns `true` if the Telegram channel should be loaded.
    pub fn comms_telegram_should_load(&self) -> bool {
        self.comms.telegram.enabled
    }

    /// Full path of the memory log file.
    pub fn memory_path(&self) -> PathBuf {
        self.work_dir.join(&self.memory_file)
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    gateway: RawGateway,
    #[serde(default)]
    comms: RawComms,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    memory: RawMemory,
}

#[derive(Deserialize)]
struct RawGateway {
    bot_name: String,
    work_dir: String,
    log_level: String,
    #[serde(default)]
    persona: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    pty: RawPty,
    #[serde(default)]
    telegram: RawTelegram,
}

#[derive(Deserialize)]
struct RawPty {
    /// Defaults to `true`: PTY auto-enables when no other channel is present.
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize)]
struct RawTelegram {
    /// Defaults to `false`: Telegram must be explicitly enabled.
    #[serde(default = "default_false")]
    enabled: bool,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self { enabled: false }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    ollama: RawOllamaConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), ollama: RawOllamaConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOllamaConfig {
    #[serde(default = "default_ollama_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_probe_timeout_seconds")]
    probe_timeout_seconds: u64,
    #[serde(default = "default_generate_timeout_seconds")]
    generate_timeout_seconds: u64,
}

impl Default for RawOllamaConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_ollama_api_base_url(),
            probe_timeout_seconds: default_probe_timeout_seconds(),
            generate_timeout_seconds: default_generate_timeout_seconds(),
        }
    }
}

fn default_llm_provider() -> String { "ollama".to_string() }
fn default_ollama_api_base_url() -> String { "http://localhost:11434".to_string() }
fn default_probe_timeout_seconds() -> u64 { 8 }
fn default_generate_timeout_seconds() -> u64 { 100 }

#[derive(Deserialize)]
struct RawMemory {
    #[serde(default = "default_memory_file")]
    file: String,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self { file: default_memory_file() }
    }
}

fn default_memory_file() -> String { "memory.txt".to_string() }

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Load config from `config/default.toml` (or `path_override`), then apply
/// env-var overrides.
pub fn load(path_override: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("JARVIS_WORK_DIR").ok();
    let log_level_override = env::var("JARVIS_LOG_LEVEL").ok();
    load_from(
        Path::new(path_override.unwrap_or("config/default.toml")),
        work_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let g = parsed.gateway;

    let work_dir_str = work_dir_override.unwrap_or(&g.work_dir).to_string();
    let work_dir = expand_home(&work_dir_str);
    let log_level = log_level_override.unwrap_or(&g.log_level).to_string();

    Ok(Config {
        bot_name: g.bot_name,
        work_dir,
        log_level,
        persona: g.persona,
        comms: CommsConfig {
            pty: PtyConfig {
                enabled: parsed.comms.pty.enabled,
            },
            telegram: TelegramConfig {
                enabled: parsed.comms.telegram.enabled,
            },
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            ollama: OllamaConfig {
                api_base_url: parsed.llm.ollama.api_base_url,
                probe_timeout_seconds: parsed.llm.ollama.probe_timeout_seconds,
                generate_timeout_seconds: parsed.llm.ollama.generate_timeout_seconds,
            },
        },
        memory_file: parsed.memory.file,
        telegram_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[gateway]
bot_name = "test-bot"
work_dir = "~/.jarvis"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.bot_name, "test-bot");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.persona.is_none());
    }

    #[test]
    fn llm_defaults_apply() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.provider, "ollama");
        assert_eq!(cfg.llm.ollama.api_base_url, "http://localhost:11434");
        assert_eq!(cfg.llm.ollama.probe_timeout_seconds, 8);
        assert_eq!(cfg.llm.ollama.generate_timeout_seconds, 100);
    }

    #[test]
    fn comms_defaults_apply() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert!(cfg.comms.pty.enabled);
        assert!(!cfg.comms.telegram.enabled);
    }

    #[test]
    fn memory_path_resolves_under_work_dir() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/jarvis-test"), None).unwrap();
        assert_eq!(cfg.memory_path(), PathBuf::from("/tmp/jarvis-test/memory.txt"));
    }

    #[test]
    fn explicit_sections_parse() {
        let f = write_toml(
            r#"
[gateway]
bot_name = "jarvis"
work_dir = "/var/lib/jarvis"
log_level = "debug"
persona = "You are a terse butler."

[comms.telegram]
enabled = true

[llm]
default = "dummy"

[llm.ollama]
api_base_url = "http://10.0.0.2:11434"
generate_timeout_seconds = 30

[memory]
file = "notes.txt"
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.persona.as_deref(), Some("You are a terse butler."));
        assert!(cfg.comms.telegram.enabled);
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.ollama.api_base_url, "http://10.0.0.2:11434");
        assert_eq!(cfg.llm.ollama.generate_timeout_seconds, 30);
        // Unset timeout keeps its default.
        assert_eq!(cfg.llm.ollama.probe_timeout_seconds, 8);
        assert_eq!(cfg.memory_file, "notes.txt");
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.jarvis");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".jarvis"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let p = expand_home("/absolute/path");
        assert_eq!(p, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn relative_path_unchanged() {
        let p = expand_home("relative/path");
        assert_eq!(p, PathBuf::from("relative/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn env_work_dir_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/test-override"), None).unwrap();
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/test-override"));
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, Some("debug")).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }
}
