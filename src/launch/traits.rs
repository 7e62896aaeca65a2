// Traits for dependency injection - steps and the flags they consult

use async_trait::async_trait;
use std::fmt;

use super::context::StepContext;
use super::errors::StepError;
use super::types::StepDisposition;

/// One unit of launch-time initialization work
#[async_trait]
pub trait LaunchStep: Send + Sync {
    /// Stable name used in logs and reports
    fn name(&self) -> &str;

    /// Whether the step should run. Evaluated when the sequencer reaches the step.
    fn should_run(&self) -> bool;

    /// The step's work. Progress is described through `ctx`.
    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError>;
}

/// Feature flags a step predicate can consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    FetchOne,
    ShowDidFinish,
    ShowOnboarding,
    FetchTwo,
    ForceUpdate,
}

/// Synchronous, side-effect free source of flag values
pub trait FlagSource: Send + Sync {
    fn is_enabled(&self, flag: Flag) -> bool;
}

/// Run `step` if its predicate allows it.
///
/// This is the only way the sequencer starts a step: a skipped step never sees
/// its context, so it cannot touch progress state or wait on anything.
pub async fn start_if_eligible(
    step: &dyn LaunchStep,
    ctx: &StepContext<'_>,
) -> Result<StepDisposition, StepError> {
    if !step.should_run() {
        return Ok(StepDisposition::Skipped);
    }
    step.run(ctx).await?;
    Ok(StepDisposition::Ran)
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::FetchOne => "fetch_one",
            Flag::ShowDidFinish => "show_did_finish",
            Flag::ShowOnboarding => "show_onboarding",
            Flag::FetchTwo => "fetch_two",
            Flag::ForceUpdate => "force_update",
        };
        f.write_str(name)
    }
}
