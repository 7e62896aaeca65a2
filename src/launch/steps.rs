//! Concrete launch steps.
//!
//! The set of steps is configuration: [`default_steps`] assembles the stock
//! launch sequence from [`LaunchConfig`], but any ordered list of
//! [`LaunchStep`] implementations can be handed to the sequencer.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LaunchConfig;

use super::context::StepContext;
use super::errors::StepError;
use super::traits::{Flag, FlagSource, LaunchStep};
use super::types::{ProgressState, Route};

/// Predicate backed by one flag of an injected source
#[derive(Clone)]
pub struct FlagGate {
    source: Arc<dyn FlagSource>,
    flag: Flag,
}

impl FlagGate {
    pub fn new(source: Arc<dyn FlagSource>, flag: Flag) -> Self {
        Self { source, flag }
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn is_open(&self) -> bool {
        self.source.is_enabled(self.flag)
    }
}

/// Shows the loader while simulated work runs, then goes back to idle
pub struct TimedBusyStep {
    name: String,
    gate: FlagGate,
    duration: Duration,
}

impl TimedBusyStep {
    pub fn new(name: impl Into<String>, gate: FlagGate, duration: Duration) -> Self {
        Self {
            name: name.into(),
            gate,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl LaunchStep for TimedBusyStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&self) -> bool {
        self.gate.is_open()
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.transition(ProgressState::Busy);
        ctx.sleep(self.duration).await?;
        ctx.transition(ProgressState::Idle);
        Ok(())
    }
}

/// Shows the onboarding call-to-action and waits for the user to continue
pub struct OnboardingStep {
    name: String,
    gate: FlagGate,
}

impl OnboardingStep {
    pub fn new(name: impl Into<String>, gate: FlagGate) -> Self {
        Self {
            name: name.into(),
            gate,
        }
    }
}

#[async_trait]
impl LaunchStep for OnboardingStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&self) -> bool {
        self.gate.is_open()
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.suspend_until_resumed(Route::CallToAction).await
    }
}

/// Flashes a route for a while, then goes back to idle
pub struct AnnounceStep {
    name: String,
    gate: FlagGate,
    route: Route,
    duration: Duration,
}

impl AnnounceStep {
    pub fn new(name: impl Into<String>, gate: FlagGate, route: Route, duration: Duration) -> Self {
        Self {
            name: name.into(),
            gate,
            route,
            duration,
        }
    }
}

#[async_trait]
impl LaunchStep for AnnounceStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&self) -> bool {
        self.gate.is_open()
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.transition(ProgressState::Routed(self.route.clone()));
        ctx.sleep(self.duration).await?;
        ctx.transition(ProgressState::Idle);
        Ok(())
    }
}

/// Parks the view on the needs-update screen, which halts the pipeline
pub struct ForceUpdateGateStep {
    name: String,
    gate: FlagGate,
}

impl ForceUpdateGateStep {
    pub fn new(name: impl Into<String>, gate: FlagGate) -> Self {
        Self {
            name: name.into(),
            gate,
        }
    }
}

#[async_trait]
impl LaunchStep for ForceUpdateGateStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&self) -> bool {
        self.gate.is_open()
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        tracing::warn!(step = %self.name, "Installed version is no longer supported");
        ctx.transition(ProgressState::Routed(Route::NeedsUpdate));
        Ok(())
    }
}

/// Stock launch sequence: update gate, first fetch, finished flash,
/// onboarding, second fetch.
pub fn default_steps(config: &LaunchConfig, flags: Arc<dyn FlagSource>) -> Vec<Box<dyn LaunchStep>> {
    let gate = |flag| FlagGate::new(Arc::clone(&flags), flag);
    let timings = &config.timings;

    vec![
        Box::new(ForceUpdateGateStep::new("force-update", gate(Flag::ForceUpdate))),
        Box::new(TimedBusyStep::new(
            "fetch-one",
            gate(Flag::FetchOne),
            Duration::from_millis(timings.fetch_one_ms),
        )),
        Box::new(AnnounceStep::new(
            "did-finish",
            gate(Flag::ShowDidFinish),
            Route::Finished,
            Duration::from_millis(timings.did_finish_ms),
        )),
        Box::new(OnboardingStep::new("onboarding", gate(Flag::ShowOnboarding))),
        Box::new(TimedBusyStep::new(
            "fetch-two",
            gate(Flag::FetchTwo),
            Duration::from_millis(timings.fetch_two_ms),
        )),
    ]
}
