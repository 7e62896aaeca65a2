// Launch Module - sequential initialization steps driving the launch view
//
// Steps run one at a time through a StepSequencer. Each step reports progress
// through its StepContext, which owns the only write path to ProgressState.

pub mod context;
pub mod errors;
pub mod progress;
pub mod resume;
pub mod sequencer;
pub mod steps;
pub mod traits;
pub mod types;

pub use context::StepContext;
pub use errors::{LaunchError, StepError};
pub use progress::ProgressCell;
pub use resume::{resume_channel, ResumeHandle, ResumeSignal};
pub use sequencer::StepSequencer;
pub use steps::{default_steps, AnnounceStep, FlagGate, ForceUpdateGateStep, OnboardingStep, TimedBusyStep};
pub use traits::{start_if_eligible, Flag, FlagSource, LaunchStep};
pub use types::{
    PipelineOutcome, PipelineReport, ProgressState, Route, RouteKind, StepDisposition, StepRecord,
};
