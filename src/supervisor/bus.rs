//! Supervisor bus — typed channel pair between comms channels and the
//! supervisor loop.

use tokio::sync::{mpsc, oneshot};

/// A message from a comms channel, with a reply slot for the response.
pub struct ChatRequest {
    /// Which channel the message arrived on (log context only).
    pub channel_id: String,
    /// The raw message text received from the channel.
    pub content: String,
    /// Send the reply back through this sender.
    pub reply_tx: oneshot::Sender<String>,
}

/// Owns the supervisor-side channel ends.
pub struct SupervisorBus {
    /// Supervisor receives inbound messages here.
    pub rx: mpsc::Receiver<ChatRequest>,
    /// Cloneable sender given to comms channels to submit messages.
    pub tx: mpsc::Sender<ChatRequest>,
}

impl SupervisorBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer);
        Self { rx, tx }
    }
}
