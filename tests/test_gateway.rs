//! End-to-end dispatch flows: gateway + memory persistence + supervisor bus,
//! driven through the dummy provider so no inference server is needed.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use jarvis_bot::comms::{CommsEvent, CommsState};
use jarvis_bot::gateway::{Gateway, NOT_CONFIGURED, prompt};
use jarvis_bot::llm::LlmProvider;
use jarvis_bot::llm::providers::dummy::DummyProvider;
use jarvis_bot::memory::MemoryLog;
use jarvis_bot::supervisor::{self, bus::SupervisorBus};

fn gateway_at(path: &Path, provider: DummyProvider) -> Gateway {
    Gateway::new(
        LlmProvider::Dummy(provider),
        prompt::DEFAULT_PERSONA.to_string(),
        MemoryLog::load(path),
    )
}

#[tokio::test]
async fn remember_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.txt");

    let mut gw = gateway_at(&path, DummyProvider::new());
    gw.startup_probe().await;

    assert_eq!(gw.dispatch("remember this: the sky is blue").await, "🧠 Logged.");
    let listing = gw.dispatch("/memory").await;
    assert!(listing.lines().last().unwrap().ends_with("the sky is blue"));

    // Fresh process: state is rebuilt wholesale from the file.
    let mut restarted = gateway_at(&path, DummyProvider::new());
    restarted.startup_probe().await;
    let listing = restarted.dispatch("/memory").await;
    assert!(listing.contains("the sky is blue"));
}

#[tokio::test]
async fn hello_without_configured_runtime_is_fixed_string() {
    let dir = TempDir::new().unwrap();
    let mut gw = gateway_at(&dir.path().join("memory.txt"), DummyProvider::unreachable());
    gw.startup_probe().await;

    assert_eq!(gw.dispatch("hello").await, NOT_CONFIGURED);
}

#[tokio::test]
async fn upstream_500_leaves_memory_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.txt");

    let mut gw = gateway_at(&path, DummyProvider::failing_http(500));
    gw.startup_probe().await;
    gw.dispatch("remember this: precious fact").await;
    let before = fs::read_to_string(&path).unwrap();

    let reply = gw.dispatch("what do you know?").await;
    assert!(reply.contains("500"), "got: {reply}");
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn forget_removes_the_file_for_good() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memory.txt");

    let mut gw = gateway_at(&path, DummyProvider::new());
    gw.dispatch("remember this: soon gone").await;
    assert!(path.exists());

    assert_eq!(gw.dispatch("/forget").await, "🧠 Memory wiped clean.");
    assert!(!path.exists());
    assert_eq!(gw.dispatch("/memory").await, "🧠 Nothing remembered yet.");

    // A restart after the wipe starts empty too.
    let mut restarted = gateway_at(&path, DummyProvider::new());
    assert_eq!(restarted.dispatch("/memory").await, "🧠 Nothing remembered yet.");
}

#[tokio::test]
async fn comms_state_round_trips_through_the_supervisor() {
    let dir = TempDir::new().unwrap();
    let mut gw = gateway_at(&dir.path().join("memory.txt"), DummyProvider::new());
    gw.startup_probe().await;

    let bus = SupervisorBus::new(8);
    let (event_tx, _event_rx) = mpsc::channel::<CommsEvent>(8);
    let state = CommsState::new(bus.tx.clone(), event_tx);

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(supervisor::run(bus, shutdown.clone(), gw));

    let reply = state
        .send_message("test0", "remember this: channels work".to_string())
        .await
        .unwrap();
    assert_eq!(reply, "🧠 Logged.");

    let listing = state.send_message("test0", "/memory".to_string()).await.unwrap();
    assert!(listing.contains("channels work"));

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn send_message_errors_after_supervisor_exit() {
    let dir = TempDir::new().unwrap();
    let gw = gateway_at(&dir.path().join("memory.txt"), DummyProvider::new());

    let bus = SupervisorBus::new(8);
    let (event_tx, _event_rx) = mpsc::channel::<CommsEvent>(8);
    let state = CommsState::new(bus.tx.clone(), event_tx);

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(supervisor::run(bus, shutdown.clone(), gw));
    shutdown.cancel();
    handle.await.unwrap();

    // The supervisor is gone: the request is either rejected at the bus or
    // its reply slot is dropped — both surface as a comms error.
    let err = state.send_message("test0", "hello".to_string()).await.unwrap_err();
    assert!(err.to_string().contains("comms error"));
}

#[tokio::test]
async fn override_param_falls_back_when_absent_from_registry() {
    let dir = TempDir::new().unwrap();
    let mut gw = gateway_at(
        &dir.path().join("memory.txt"),
        DummyProvider::with_models(vec!["alpha".into(), "beta".into()]),
    );
    gw.startup_probe().await;

    let reply = gw.generate("hi", Some("nonexistent")).await;
    assert!(reply.starts_with("[echo:alpha]"), "got: {reply}");
}
