//! Shared launch test fixtures: scripted steps that log every call, a flag
//! source that can change while a pipeline runs, and a recording presenter.
#![allow(dead_code)]

use app_init::{
    Flag, FlagSource, LaunchError, LaunchStep, Presenter, ProgressState, Route, StepContext,
    StepError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Observable calls made by the sequencer into a scripted step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ShouldRun(&'static str, bool),
    RunStarted(&'static str),
    RunFinished(&'static str),
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn runs_of(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::RunStarted(n) if *n == name))
            .count()
    }

    pub fn was_reached(&self, name: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::ShouldRun(n, _) if *n == name))
    }
}

/// Flag source whose values can be flipped at any time
#[derive(Default)]
pub struct ToggleFlags {
    values: Mutex<HashMap<Flag, bool>>,
}

impl ToggleFlags {
    pub fn new(initial: &[(Flag, bool)]) -> Arc<Self> {
        let flags = Self::default();
        for (flag, value) in initial {
            flags.set(*flag, *value);
        }
        Arc::new(flags)
    }

    pub fn set(&self, flag: Flag, value: bool) {
        self.values.lock().unwrap().insert(flag, value);
    }
}

impl FlagSource for ToggleFlags {
    fn is_enabled(&self, flag: Flag) -> bool {
        self.values.lock().unwrap().get(&flag).copied().unwrap_or(false)
    }
}

pub enum Behavior {
    /// Busy then idle, no wait
    Succeed,
    /// Busy, then fail with the message
    Fail(&'static str),
    /// Busy, wait, idle
    Busy(Duration),
    /// Call-to-action, suspended until resumed
    WaitForUser,
    /// Route the view and return right away
    Leave(Route),
    /// Set a flag, then succeed without touching progress
    Toggle(Arc<ToggleFlags>, Flag, bool),
}

enum Eligibility {
    Fixed(bool),
    Gated(Arc<dyn FlagSource>, Flag),
}

pub struct ScriptedStep {
    name: &'static str,
    eligibility: Eligibility,
    behavior: Behavior,
    log: CallLog,
}

impl ScriptedStep {
    pub fn boxed(
        name: &'static str,
        eligible: bool,
        behavior: Behavior,
        log: &CallLog,
    ) -> Box<dyn LaunchStep> {
        Box::new(Self {
            name,
            eligibility: Eligibility::Fixed(eligible),
            behavior,
            log: log.clone(),
        })
    }

    pub fn gated(
        name: &'static str,
        source: Arc<dyn FlagSource>,
        flag: Flag,
        behavior: Behavior,
        log: &CallLog,
    ) -> Box<dyn LaunchStep> {
        Box::new(Self {
            name,
            eligibility: Eligibility::Gated(source, flag),
            behavior,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl LaunchStep for ScriptedStep {
    fn name(&self) -> &str {
        self.name
    }

    fn should_run(&self) -> bool {
        let eligible = match &self.eligibility {
            Eligibility::Fixed(value) => *value,
            Eligibility::Gated(source, flag) => source.is_enabled(*flag),
        };
        self.log.push(Call::ShouldRun(self.name, eligible));
        eligible
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        self.log.push(Call::RunStarted(self.name));
        let result = match &self.behavior {
            Behavior::Succeed => {
                ctx.transition(ProgressState::Busy);
                ctx.transition(ProgressState::Idle);
                Ok(())
            }
            Behavior::Fail(message) => {
                ctx.transition(ProgressState::Busy);
                Err(StepError::failed(*message))
            }
            Behavior::Busy(duration) => {
                ctx.transition(ProgressState::Busy);
                let waited = ctx.sleep(*duration).await;
                if waited.is_ok() {
                    ctx.transition(ProgressState::Idle);
                }
                waited
            }
            Behavior::WaitForUser => ctx.suspend_until_resumed(Route::CallToAction).await,
            Behavior::Leave(route) => {
                ctx.transition(ProgressState::Routed(route.clone()));
                Ok(())
            }
            Behavior::Toggle(flags, flag, value) => {
                flags.set(*flag, *value);
                Ok(())
            }
        };
        self.log.push(Call::RunFinished(self.name));
        result
    }
}

/// Presenter that keeps everything it was shown
#[derive(Default)]
pub struct RecordingPresenter {
    pub rendered: Vec<String>,
    pub done: usize,
    pub failures: Vec<String>,
    /// Press the call-to-action button as soon as it is rendered
    pub auto_resume: bool,
}

impl RecordingPresenter {
    pub fn auto_resuming() -> Self {
        Self {
            auto_resume: true,
            ..Self::default()
        }
    }

    pub fn saw(&self, label: &str) -> bool {
        self.rendered.iter().any(|r| r == label)
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, state: &ProgressState) {
        self.rendered.push(state.label());
        if self.auto_resume {
            if let Some(handle) = state.route().and_then(Route::resume_handle) {
                handle.resume();
            }
        }
    }

    fn launch_done(&mut self) {
        self.done += 1;
    }

    fn launch_failed(&mut self, error: &LaunchError) {
        self.failures.push(error.to_string());
    }
}

/// Wait until the pipeline shows the call-to-action and return its handle
pub async fn wait_for_call_to_action(
    rx: &mut tokio::sync::watch::Receiver<ProgressState>,
) -> app_init::ResumeHandle {
    let state = rx
        .wait_for(|s| matches!(s, ProgressState::Routed(Route::CallToAction(_))))
        .await
        .expect("pipeline ended before showing the call-to-action");
    state
        .route()
        .and_then(Route::resume_handle)
        .cloned()
        .expect("call-to-action carries a resume handle")
}
