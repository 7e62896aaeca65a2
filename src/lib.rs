// AppInit Library - sequential launch steps driving a launch view
// This exposes the core components for testing and integration

pub mod config;
pub mod launch;
pub mod observability;
pub mod presentation;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{FeatureFlags, LaunchConfig, ObservabilityConfig, TimingConfig};
pub use launch::{
    default_steps, resume_channel, start_if_eligible, Flag, FlagSource, LaunchError, LaunchStep,
    PipelineOutcome, PipelineReport, ProgressState, ResumeHandle, Route, RouteKind, StepContext,
    StepDisposition, StepError, StepRecord, StepSequencer,
};
pub use observability::{LaunchMetrics, LaunchStats, OperationTimer};
pub use presentation::{screen_for, LaunchPhase, LaunchScreen, Presenter, Router, Screen};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_pipeline_span, generate_correlation_id, init_telemetry};
