//! Shared state for the comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and are restricted to the typed
//! methods below. The raw bus sender is private; channels cannot reach the
//! gateway except by submitting a message and awaiting its reply.

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::error::AppError;
use crate::supervisor::bus::ChatRequest;

// ── Events ────────────────────────────────────────────────────────────────────

/// Events a channel sends back to the comms subsystem manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Shared state passed as `Arc<CommsState>` to every channel task.
pub struct CommsState {
    /// Supervisor bus sender — private so channels can't hold the receiver side.
    bus_tx: mpsc::Sender<ChatRequest>,
    /// Back-channel to the comms subsystem manager.
    event_tx: mpsc::Sender<CommsEvent>,
}

impl CommsState {
    pub fn new(bus_tx: mpsc::Sender<ChatRequest>, event_tx: mpsc::Sender<CommsEvent>) -> Self {
        Self { bus_tx, event_tx }
    }

    /// Send `content` from `channel_id` to the supervisor and await the
    /// reply string.
    ///
    /// This is the only outbound path for comms channels.
    pub async fn send_message(&self, channel_id: &str, content: String) -> Result<String, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.bus_tx
            .send(ChatRequest {
                channel_id: channel_id.to_string(),
                content,
                reply_tx,
            })
            .await
            .map_err(|_| AppError::Comms("supervisor bus closed".to_string()))?;

        reply_rx
            .await
            .map_err(|_| AppError::Comms("supervisor dropped the reply".to_string()))
    }

    /// Report an event to the comms subsystem manager.
    ///
    /// Non-blocking: drops the event and logs a warning if the manager is not
    /// keeping up (channel full) or has already exited (closed).
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}
