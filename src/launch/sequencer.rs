//! Sequential step runner.
//!
//! Steps run strictly one after another: step N+1's predicate is not evaluated
//! before step N's action, including any suspension, has resolved. The first
//! failure ends the run. A step that leaves the view on a terminal route while
//! later steps remain halts the run without firing pipeline-done; the last
//! step may leave one and the run still completes.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, info_span, warn, Instrument};

use crate::observability::{LaunchMetrics, OperationTimer};
use crate::telemetry::{create_pipeline_span, generate_correlation_id};

use super::context::StepContext;
use super::errors::LaunchError;
use super::progress::ProgressCell;
use super::traits::{start_if_eligible, LaunchStep};
use super::types::{PipelineOutcome, PipelineReport, ProgressState, StepRecord};

/// One-shot runner over an ordered, fixed list of steps
pub struct StepSequencer {
    steps: Vec<Box<dyn LaunchStep>>,
    progress: ProgressCell,
    cancel: Option<watch::Receiver<bool>>,
    metrics: Arc<LaunchMetrics>,
    correlation_id: String,
    position: usize,
    records: Vec<StepRecord>,
    outcome: Option<PipelineOutcome>,
    finished: bool,
}

impl StepSequencer {
    pub fn new(steps: Vec<Box<dyn LaunchStep>>) -> Self {
        Self {
            steps,
            progress: ProgressCell::new(),
            cancel: None,
            metrics: Arc::new(LaunchMetrics::new()),
            correlation_id: generate_correlation_id(),
            position: 0,
            records: Vec::new(),
            outcome: None,
            finished: false,
        }
    }

    /// Cancel the in-flight wait once `token` turns `true`
    pub fn with_cancellation(mut self, token: watch::Receiver<bool>) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<LaunchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.progress.subscribe()
    }

    pub fn current_state(&self) -> ProgressState {
        self.progress.current()
    }

    pub fn state_writes(&self) -> usize {
        self.progress.writes()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Index of the next step to resolve
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Resolve the next step.
    ///
    /// Returns `None` once every step has resolved, or after a failure or a
    /// halt. A failure is yielded exactly once.
    pub async fn next(&mut self) -> Option<Result<StepRecord, LaunchError>> {
        if self.finished {
            return None;
        }
        let Some(step) = self.steps.get(self.position) else {
            self.finished = true;
            self.outcome = Some(PipelineOutcome::Completed);
            return None;
        };

        let index = self.position;
        let name = step.name().to_string();
        let span = info_span!("launch_step", step = %name, index);

        let started_at = chrono::Utc::now();
        let timer = OperationTimer::new(&name);
        let result = {
            let ctx = StepContext::new(&name, index, &self.progress, self.cancel.clone());
            start_if_eligible(step.as_ref(), &ctx)
                .instrument(span)
                .await
        };
        let elapsed = timer.finish();

        match result {
            Ok(disposition) => {
                self.metrics.record_step(disposition);
                let record = StepRecord {
                    index,
                    name,
                    disposition,
                    started_at,
                    elapsed,
                };
                self.records.push(record.clone());
                self.position += 1;

                // A terminal route on the last step is the normal end of a launch
                let remaining = self.steps.len() - self.position;
                if let Some(route) = self
                    .progress
                    .current()
                    .terminal_route()
                    .filter(|_| remaining > 0)
                {
                    warn!(
                        step = %record.name,
                        route = %route,
                        "Step left a terminal route, halting launch"
                    );
                    self.finished = true;
                    self.outcome = Some(PipelineOutcome::Halted {
                        step: record.name.clone(),
                        route,
                    });
                }
                Some(Ok(record))
            }
            Err(step_error) => {
                self.finished = true;
                let launch_error = LaunchError::from_step(&name, index, step_error);
                if launch_error.is_cancelled() {
                    self.metrics.record_cancelled();
                } else {
                    self.metrics.record_failed();
                }
                Some(Err(launch_error))
            }
        }
    }

    /// Run every remaining step.
    ///
    /// `on_done` fires exactly once, after the last step resolved, and only
    /// when the run completed. A failure is returned instead; a halt returns a
    /// report with a halted outcome.
    pub async fn run<F>(mut self, on_done: F) -> Result<PipelineReport, LaunchError>
    where
        F: FnOnce(),
    {
        let span = create_pipeline_span(&self.correlation_id, self.steps.len());
        async move {
            info!(steps = self.steps.len(), "Starting launch pipeline");
            self.metrics.record_pipeline_started();

            while let Some(result) = self.next().await {
                if let Err(e) = result {
                    error!(error = %e, "Launch pipeline failed");
                    return Err(e);
                }
            }

            let report = self.into_report();
            match &report.outcome {
                PipelineOutcome::Completed => {
                    info!(
                        ran = report.ran().count(),
                        skipped = report.skipped().count(),
                        "Launch pipeline done"
                    );
                    on_done();
                }
                PipelineOutcome::Halted { step, route } => {
                    info!(step = %step, route = %route, "Launch pipeline halted");
                }
            }
            Ok(report)
        }
        .instrument(span)
        .await
    }

    fn into_report(self) -> PipelineReport {
        PipelineReport {
            state_writes: self.progress.writes(),
            correlation_id: self.correlation_id,
            records: self.records,
            outcome: self.outcome.unwrap_or(PipelineOutcome::Completed),
        }
    }
}
