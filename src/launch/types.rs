// Core types for the launch pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::resume::ResumeHandle;

/// What the launch view currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProgressState {
    /// Nothing in flight, the launch view shows the logo
    #[default]
    Idle,
    /// A step is doing work, the launch view shows a loader
    Busy,
    /// A step routed the launch view to a specific screen
    Routed(Route),
}

/// Screens a step can route the launch view to
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Call-to-action screen; the handle resumes the suspended step
    CallToAction(ResumeHandle),
    /// The app must be updated before it can be used
    NeedsUpdate,
    /// Something went wrong during launch
    Error,
    /// Launch finished successfully
    Finished,
}

/// Payload-free discriminant of a [`Route`], safe to log and serialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    CallToAction,
    NeedsUpdate,
    Error,
    Finished,
}

/// Whether a step actually ran or was skipped by its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDisposition {
    Ran,
    Skipped,
}

/// Diagnostic record for one resolved step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub name: String,
    pub disposition: StepDisposition,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed: Duration,
}

/// How a pipeline run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Every step ran or was skipped
    Completed,
    /// A step left the view on a terminal route, later steps never started
    Halted { step: String, route: RouteKind },
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub correlation_id: String,
    pub records: Vec<StepRecord>,
    #[serde(flatten)]
    pub outcome: PipelineOutcome,
    pub state_writes: usize,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::CallToAction(_) => RouteKind::CallToAction,
            Route::NeedsUpdate => RouteKind::NeedsUpdate,
            Route::Error => RouteKind::Error,
            Route::Finished => RouteKind::Finished,
        }
    }

    /// Terminal routes end the launch; only a call-to-action can be left by the user
    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    pub fn resume_handle(&self) -> Option<&ResumeHandle> {
        match self {
            Route::CallToAction(handle) => Some(handle),
            _ => None,
        }
    }
}

impl RouteKind {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RouteKind::CallToAction)
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteKind::CallToAction => "call_to_action",
            RouteKind::NeedsUpdate => "needs_update",
            RouteKind::Error => "error",
            RouteKind::Finished => "finished",
        };
        f.write_str(name)
    }
}

impl ProgressState {
    pub fn route(&self) -> Option<&Route> {
        match self {
            ProgressState::Routed(route) => Some(route),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ProgressState::Busy)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ProgressState::Idle)
    }

    /// Terminal route, if the state is parked on one
    pub fn terminal_route(&self) -> Option<RouteKind> {
        self.route()
            .map(Route::kind)
            .filter(RouteKind::is_terminal)
    }

    /// Short label used in logs
    pub fn label(&self) -> String {
        match self {
            ProgressState::Idle => "idle".to_string(),
            ProgressState::Busy => "busy".to_string(),
            ProgressState::Routed(route) => format!("routed:{}", route.kind()),
        }
    }
}

impl PipelineReport {
    pub fn ran(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| r.disposition == StepDisposition::Ran)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| r.disposition == StepDisposition::Skipped)
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == PipelineOutcome::Completed
    }
}
