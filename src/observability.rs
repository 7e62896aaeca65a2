use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::launch::StepDisposition;

/// Launch pipeline counters
#[derive(Debug, Default)]
pub struct LaunchMetrics {
    pub pipelines_started: AtomicU64,
    pub steps_ran: AtomicU64,
    pub steps_skipped: AtomicU64,
    pub steps_failed: AtomicU64,
    pub steps_cancelled: AtomicU64,
}

impl LaunchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pipeline_started(&self) {
        self.pipelines_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_step(&self, disposition: StepDisposition) {
        match disposition {
            StepDisposition::Ran => self.steps_ran.fetch_add(1, Ordering::Relaxed),
            StepDisposition::Skipped => self.steps_skipped.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_failed(&self) {
        self.steps_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.steps_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> LaunchStats {
        LaunchStats {
            pipelines_started: self.pipelines_started.load(Ordering::Relaxed),
            steps_ran: self.steps_ran.load(Ordering::Relaxed),
            steps_skipped: self.steps_skipped.load(Ordering::Relaxed),
            steps_failed: self.steps_failed.load(Ordering::Relaxed),
            steps_cancelled: self.steps_cancelled.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Launch metrics: pipelines={}, ran={}, skipped={}, failed={}, cancelled={}",
            stats.pipelines_started,
            stats.steps_ran,
            stats.steps_skipped,
            stats.steps_failed,
            stats.steps_cancelled
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchStats {
    pub pipelines_started: u64,
    pub steps_ran: u64,
    pub steps_skipped: u64,
    pub steps_failed: u64,
    pub steps_cancelled: u64,
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        debug!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
        duration
    }
}
