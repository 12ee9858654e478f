//! Generic channel runtime — shared scaffolding for comms channels.
//!
//! A [`Component`] is any independently-runnable channel task (PTY,
//! Telegram…). The subsystem constructs components with their shared state
//! already captured inside them, then hands them to [`spawn_components`],
//! which returns a [`SubsystemHandle`] the caller can `.await`. Any
//! component error cancels the shared [`CancellationToken`] so sibling
//! components and the supervisor all shut down cleanly.

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::AppError;

// ── Component ─────────────────────────────────────────────────────────────────

/// A boxed, owned future returned by [`Component::run`].
pub type ComponentFuture =
    Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A self-contained, concurrently-runnable channel task.
///
/// Implementors capture all shared state (`Arc<CommsState>`, tokens…) at
/// construction time. [`Component::run`] is called once by
/// [`spawn_components`] and should run until `shutdown` is cancelled or the
/// component's own work is done.
pub trait Component: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Consume the component and return its async run-loop as a boxed future.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── SubsystemHandle ───────────────────────────────────────────────────────────

/// An opaque handle to the running channel task set.
pub struct SubsystemHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl SubsystemHandle {
    /// Await all components and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("comms task panicked: {e}"))),
        }
    }
}

// ── spawn_components ──────────────────────────────────────────────────────────

/// Spawn each [`Component`] as an independent Tokio task and return a
/// [`SubsystemHandle`] that resolves when all components have exited.
///
/// Behaviour on error:
/// - If any component returns `Err`, `shutdown` is cancelled so all siblings
///   receive the cancellation signal and stop cooperatively.
/// - The manager task then drains the remaining components and returns the
///   first error encountered.
pub fn spawn_components(
    components: Vec<Box<dyn Component>>,
    shutdown: CancellationToken,
) -> SubsystemHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();

        for component in components {
            let id = component.id().to_string();
            let shutdown = shutdown.clone();
            debug!(component = %id, "spawning channel");
            set.spawn(component.run(shutdown));
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                // Component panicked.
                Err(e) => {
                    error!("channel panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| {
                        AppError::Comms(format!("channel panicked: {e}"))
                    });
                }
                // Component returned an error.
                Ok(Err(e)) => {
                    error!("channel error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                // Component exited cleanly.
                Ok(Ok(())) => {}
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    SubsystemHandle { inner: handle }
}
