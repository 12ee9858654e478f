//! Jarvis Bot — assistant gateway entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Validate the transport token (halts before serving anything)
//!   7. Load the memory log, build the provider, probe the runtime
//!   8. Spawn Ctrl-C → shutdown signal watcher
//!   9. Spawn the supervisor loop (owns the gateway)
//!  10. Run comms channels until shutdown, then join the supervisor

use tokio_util::sync::CancellationToken;
use tracing::info;

use jarvis_bot::comms;
use jarvis_bot::config::{self, Config};
use jarvis_bot::error::AppError;
use jarvis_bot::gateway::{Gateway, prompt};
use jarvis_bot::llm::providers;
use jarvis_bot::logger;
use jarvis_bot::memory::MemoryLog;
use jarvis_bot::supervisor::{self, bus::SupervisorBus};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bot_name = %config.bot_name,
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    // Misconfiguration halts before any request is served.
    if config.comms_telegram_should_load() && config.telegram_token.is_none() {
        return Err(AppError::Config(
            "TELEGRAM_BOT_TOKEN not set — required when the telegram channel is enabled".into(),
        ));
    }

    std::fs::create_dir_all(&config.work_dir)?;

    let memory = MemoryLog::load(config.memory_path());
    info!(entries = memory.len(), path = %config.memory_path().display(), "memory log loaded");

    let provider = providers::build(&config.llm).map_err(|e| AppError::Config(e.to_string()))?;
    let persona = config
        .persona
        .clone()
        .unwrap_or_else(|| prompt::DEFAULT_PERSONA.to_string());

    let mut gateway = Gateway::new(provider, persona, memory);
    gateway.startup_probe().await;

    // Shared shutdown token — Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    print_startup_summary(&config, &gateway);

    // Build the supervisor bus (buffer = 64 messages) and hand the gateway
    // to the supervisor loop — it serializes all state access from here on.
    let bus = SupervisorBus::new(64);
    let bus_tx = bus.tx.clone();
    let sup_token = shutdown.clone();
    let sup_handle = tokio::spawn(supervisor::run(bus, sup_token, gateway));

    // Start comms channels as independent concurrent tasks.
    let comms = comms::start(&config, bus_tx, shutdown.clone());
    comms.join().await?;

    // If comms exited due to EOF (not Ctrl-C), still signal everything to stop.
    shutdown.cancel();
    sup_handle.await.ok();

    Ok(())
}

fn print_startup_summary(config: &Config, gateway: &Gateway) {
    println!("──────────────────────────────────────────");
    println!(" 🤖 {} gateway", config.bot_name);
    println!(
        "    llm: {} @ {}",
        config.llm.provider, config.llm.ollama.api_base_url
    );
    println!(
        "    runtime: {}",
        if gateway.runtime_ready() { "✅ reachable" } else { "❌ unavailable" }
    );
    println!(
        "    models: {} (active: {})",
        gateway.models().len(),
        gateway.active_model().unwrap_or("None")
    );
    println!("    memories: {}", gateway.memory().len());
    println!(
        "    channels: pty={} telegram={}",
        config.comms.pty.enabled, config.comms.telegram.enabled
    );
    println!("──────────────────────────────────────────");
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: jarvis-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn   (suppress info noise, show warnings+errors only)
    //   -vv     → info   (normal operational output — the typical default)
    //   -vvv    → debug  (flow-level diagnostics: routing, probe results)
    //   -vvvv+  → trace  (full payload dumps, very verbose)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
