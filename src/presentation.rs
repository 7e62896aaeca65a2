//! Presentation adapter for the launch pipeline.
//!
//! Maps progress states to screens, renders every observed transition through
//! a [`Presenter`] while the pipeline runs, and tracks whether the launch
//! overlay is still covering the app.

use statig::prelude::*;
use tracing::{debug, info};

use crate::launch::{
    LaunchError, PipelineOutcome, PipelineReport, ProgressState, ResumeHandle, Route, RouteKind,
    StepSequencer,
};

/// What the launch overlay displays
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Logo,
    Loader,
    CallToAction { resume: ResumeHandle },
    ForceUpdate,
    SomethingWentWrong,
    Finished,
}

impl Screen {
    pub fn headline(&self) -> &'static str {
        match self {
            Screen::Logo => "AppInit",
            Screen::Loader => "Loading...",
            Screen::CallToAction { .. } => "This is onboarding",
            Screen::ForceUpdate => "Force Update",
            Screen::SomethingWentWrong => "Something went wrong",
            Screen::Finished => "WOOOOO YOU DID IT!!! 💃💃💃",
        }
    }

    /// Label of the user-triggerable control, if the screen has one
    pub fn action_label(&self) -> Option<&'static str> {
        match self {
            Screen::CallToAction { .. } => Some("Press to continue"),
            _ => None,
        }
    }
}

/// Maps routes to screens
pub struct Router;

impl Router {
    pub fn view_from(route: &Route) -> Screen {
        match route {
            Route::CallToAction(handle) => Screen::CallToAction {
                resume: handle.clone(),
            },
            Route::NeedsUpdate => Screen::ForceUpdate,
            Route::Error => Screen::SomethingWentWrong,
            Route::Finished => Screen::Finished,
        }
    }
}

pub fn screen_for(state: &ProgressState) -> Screen {
    match state {
        ProgressState::Idle => Screen::Logo,
        ProgressState::Busy => Screen::Loader,
        ProgressState::Routed(route) => Router::view_from(route),
    }
}

/// Receives launch view updates
pub trait Presenter {
    fn render(&mut self, state: &ProgressState);

    /// The pipeline completed; the overlay should give way to the app
    fn launch_done(&mut self) {}

    /// The pipeline failed; the error screen was already rendered
    fn launch_failed(&mut self, _error: &LaunchError) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    PipelineDone,
    PipelineHalted { route: RouteKind },
    PipelineFailed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Launching,
    AppVisible,
    Halted,
    Failed,
}

/// Lifecycle of the overlay covering the app during launch
pub struct LaunchOverlay {
    pub phase: LaunchPhase,
    pub halted_on: Option<RouteKind>,
    pub failure: Option<String>,
}

impl Default for LaunchOverlay {
    fn default() -> Self {
        Self {
            phase: LaunchPhase::Launching,
            halted_on: None,
            failure: None,
        }
    }
}

#[state_machine(initial = "State::launching()")]
impl LaunchOverlay {
    #[state]
    fn launching(&mut self, event: &LaunchEvent) -> Outcome<State> {
        match event {
            LaunchEvent::PipelineDone => {
                self.phase = LaunchPhase::AppVisible;
                info!("Launch overlay dismissed");
                Transition(State::app_visible())
            }
            LaunchEvent::PipelineHalted { route } => {
                self.phase = LaunchPhase::Halted;
                self.halted_on = Some(*route);
                info!(route = %route, "Launch overlay parked");
                Transition(State::halted())
            }
            LaunchEvent::PipelineFailed { reason } => {
                self.phase = LaunchPhase::Failed;
                self.failure = Some(reason.clone());
                info!(reason = %reason, "Launch overlay showing error");
                Transition(State::failed())
            }
        }
    }

    #[state]
    fn app_visible(&mut self, event: &LaunchEvent) -> Outcome<State> {
        debug!(?event, phase = ?self.phase, "Launch already settled, ignoring event");
        Handled
    }

    #[state]
    fn halted(&mut self, event: &LaunchEvent) -> Outcome<State> {
        debug!(?event, phase = ?self.phase, "Launch already settled, ignoring event");
        Handled
    }

    #[state]
    fn failed(&mut self, event: &LaunchEvent) -> Outcome<State> {
        debug!(?event, phase = ?self.phase, "Launch already settled, ignoring event");
        Handled
    }
}

/// Drives a sequencer while keeping a presenter in sync with its progress
pub struct LaunchScreen<P: Presenter> {
    presenter: P,
    overlay: statig::blocking::StateMachine<LaunchOverlay>,
}

impl<P: Presenter> LaunchScreen<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            overlay: LaunchOverlay::default().state_machine(),
        }
    }

    pub fn phase(&self) -> LaunchPhase {
        self.overlay.inner().phase
    }

    pub fn is_launch_visible(&self) -> bool {
        self.phase() != LaunchPhase::AppVisible
    }

    pub fn failure(&self) -> Option<&str> {
        self.overlay.inner().failure.as_deref()
    }

    pub fn halted_on(&self) -> Option<RouteKind> {
        self.overlay.inner().halted_on
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Run `sequencer` to the end, rendering each state it goes through.
    ///
    /// On failure the error route is rendered before the error is returned.
    pub async fn present(&mut self, sequencer: StepSequencer) -> Result<PipelineReport, LaunchError> {
        let mut rx = sequencer.subscribe();
        let mut rendered = rx.borrow_and_update().clone();
        self.presenter.render(&rendered);

        let mut done = false;
        let result = {
            let pipeline = sequencer.run(|| done = true);
            tokio::pin!(pipeline);

            loop {
                tokio::select! {
                    result = &mut pipeline => break result,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break (&mut pipeline).await;
                        }
                        rendered = rx.borrow_and_update().clone();
                        self.presenter.render(&rendered);
                    }
                }
            }
        };

        let last = rx.borrow().clone();
        if last != rendered {
            self.presenter.render(&last);
        }

        match &result {
            Ok(report) => match &report.outcome {
                PipelineOutcome::Completed if done => {
                    self.overlay.handle(&LaunchEvent::PipelineDone);
                    self.presenter.launch_done();
                }
                PipelineOutcome::Completed => {}
                PipelineOutcome::Halted { route, .. } => {
                    self.overlay
                        .handle(&LaunchEvent::PipelineHalted { route: *route });
                }
            },
            Err(e) => {
                self.presenter.render(&ProgressState::Routed(Route::Error));
                self.overlay.handle(&LaunchEvent::PipelineFailed {
                    reason: e.to_string(),
                });
                self.presenter.launch_failed(e);
            }
        }
        result
    }
}
