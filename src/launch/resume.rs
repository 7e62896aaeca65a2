//! Single-slot resume channel for steps that wait on the user.
//!
//! A suspending step holds the [`ResumeSignal`] while the presentation layer
//! receives a [`ResumeHandle`] inside a call-to-action route. The handle can be
//! cloned freely (the route is re-rendered, logged, compared) but the
//! underlying sender is taken on the first [`ResumeHandle::resume`], so the
//! step is released at most once.

use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::errors::StepError;

/// Create a connected handle/signal pair
pub fn resume_channel() -> (ResumeHandle, ResumeSignal) {
    let (tx, rx) = oneshot::channel();
    let handle = ResumeHandle {
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (handle, ResumeSignal { rx })
}

/// User-facing side: invoked when the call-to-action is acted on
#[derive(Clone)]
pub struct ResumeHandle {
    slot: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

/// Step-facing side: resolves once the handle is resumed
#[derive(Debug)]
pub struct ResumeSignal {
    rx: oneshot::Receiver<()>,
}

impl ResumeHandle {
    /// Release the waiting step.
    ///
    /// Returns `true` only for the call that delivered the signal. Later calls,
    /// or calls after the waiting step went away, return `false` and do nothing.
    pub fn resume(&self) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(tx) => {
                let delivered = tx.send(()).is_ok();
                tracing::debug!(delivered, "Resume signal sent");
                delivered
            }
            None => {
                tracing::debug!("Resume ignored, signal already spent");
                false
            }
        }
    }

    /// True once the signal was sent (or can no longer be sent)
    pub fn is_spent(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map_or(true, |tx| tx.is_closed())
    }
}

impl ResumeSignal {
    /// Wait until the handle is resumed. No timeout.
    pub async fn wait(self) -> Result<(), StepError> {
        self.rx.await.map_err(|_| StepError::ResumeAbandoned)
    }
}

impl PartialEq for ResumeHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for ResumeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeHandle")
            .field("spent", &self.is_spent())
            .finish()
    }
}
