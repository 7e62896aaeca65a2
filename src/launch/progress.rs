// Shared progress slot observed by the presentation layer

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

use super::types::ProgressState;

/// Single mutable slot holding the pipeline-visible state.
///
/// Writes only happen through the [`StepContext`](super::context::StepContext) of
/// the step currently running, so there is never more than one writer.
/// Readers subscribe and see every value that is current when they look.
#[derive(Debug)]
pub struct ProgressCell {
    tx: watch::Sender<ProgressState>,
    writes: AtomicUsize,
}

impl Default for ProgressCell {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::Idle);
        Self {
            tx,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ProgressState {
        self.tx.borrow().clone()
    }

    /// Number of transitions applied so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    /// Overwrite the current state
    pub(crate) fn apply(&self, next: ProgressState) -> ProgressState {
        self.writes.fetch_add(1, Ordering::AcqRel);
        self.tx.send_replace(next)
    }
}
