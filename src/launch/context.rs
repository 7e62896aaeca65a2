// Coordinator-side handle a running step uses to report progress

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use super::errors::StepError;
use super::progress::ProgressCell;
use super::resume::{resume_channel, ResumeHandle};
use super::types::{ProgressState, Route};

/// Borrowed by a step for the duration of its action.
///
/// Steps describe the state they want as [`ProgressState`] values; the context
/// applies them to the shared cell. Every wait goes through the context so it
/// can be cut short by cancellation.
pub struct StepContext<'a> {
    step: &'a str,
    index: usize,
    progress: &'a ProgressCell,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        step: &'a str,
        index: usize,
        progress: &'a ProgressCell,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Self {
        Self {
            step,
            index,
            progress,
            cancel,
        }
    }

    pub fn step_name(&self) -> &str {
        self.step
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> ProgressState {
        self.progress.current()
    }

    /// Replace the progress state
    pub fn transition(&self, next: ProgressState) {
        let to = next.label();
        let from = self.progress.apply(next);
        debug!(
            step = %self.step,
            from = %from.label(),
            to = %to,
            "Progress transition"
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Timer wait that ends early with [`StepError::Cancelled`]
    pub async fn sleep(&self, duration: Duration) -> Result<(), StepError> {
        tokio::select! {
            biased;
            _ = cancelled(self.cancel.clone()) => Err(StepError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Route the view with a fresh resume handle, then wait for it.
    ///
    /// There is no timeout: the step stays suspended until the handle is
    /// resumed or the pipeline is cancelled.
    pub async fn suspend_until_resumed<F>(&self, make_route: F) -> Result<(), StepError>
    where
        F: FnOnce(ResumeHandle) -> Route + Send,
    {
        let (handle, signal) = resume_channel();
        self.transition(ProgressState::Routed(make_route(handle)));
        info!(step = %self.step, "Waiting for user action");

        let resumed = tokio::select! {
            biased;
            _ = cancelled(self.cancel.clone()) => Err(StepError::Cancelled),
            resumed = signal.wait() => resumed,
        };

        if resumed.is_ok() {
            info!(step = %self.step, "User action received");
        }
        resumed
    }
}

/// Resolves once cancellation is requested; never resolves without a token
/// or after the token's sender is gone.
async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel else {
        return std::future::pending().await;
    };
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
