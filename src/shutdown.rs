use tokio::sync::watch;
use tracing::{info, warn};

/// Cooperative cancellation for the launch pipeline.
///
/// Hands out `watch` tokens to sequencers; flipping the shared flag cuts the
/// in-flight step's wait short.
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Token for [`StepSequencer::with_cancellation`](crate::launch::StepSequencer::with_cancellation)
    pub fn token(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Request cancellation. Returns `false` if it was already requested.
    pub fn trigger(&self) -> bool {
        let first = !self.tx.send_replace(true);
        if first {
            info!("Shutdown requested, cancelling launch");
        }
        first
    }

    /// Trigger on Ctrl-C for as long as the returned task lives
    pub fn install_signal_handlers(self: std::sync::Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!("Installing signal handlers for graceful shutdown");
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    self.trigger();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        })
    }
}
