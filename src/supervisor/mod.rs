//! Supervisor — owns the gateway state and serializes message handling.

pub mod bus;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use bus::SupervisorBus;

/// Run the supervisor loop until `shutdown` is cancelled or the bus closes.
///
/// The loop holds the only reference to the [`Gateway`], so each request is
/// handled start-to-finish before the next one is taken off the bus — the
/// transport layers may deliver concurrently, but state access needs no
/// locking.
pub async fn run(mut bus: SupervisorBus, shutdown: CancellationToken, mut gateway: Gateway) {
    info!("supervisor ready");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("supervisor shutting down");
                break;
            }

            msg = bus.rx.recv() => {
                match msg {
                    Some(req) => {
                        debug!(channel_id = %req.channel_id, "handling chat request");
                        let reply = gateway.dispatch(&req.content).await;
                        if req.reply_tx.send(reply).is_err() {
                            warn!(channel_id = %req.channel_id, "requester dropped before reply");
                        }
                    }
                    None => {
                        info!("bus closed, supervisor exiting");
                        break;
                    }
                }
            }
        }
    }
}
