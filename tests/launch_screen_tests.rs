//! LaunchScreen keeps a presenter in sync with a running pipeline.

mod fixtures;

use app_init::{
    default_steps, FlagSource, LaunchConfig, LaunchPhase, LaunchScreen, PipelineOutcome,
    RouteKind, StepSequencer,
};
use fixtures::{Behavior, CallLog, RecordingPresenter, ScriptedStep};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_presenter_follows_progress_until_done() {
    let log = CallLog::new();
    let seq = StepSequencer::new(vec![
        ScriptedStep::boxed("fetch", true, Behavior::Busy(Duration::from_millis(100)), &log),
        ScriptedStep::boxed("skip", false, Behavior::Succeed, &log),
    ]);

    let mut screen = LaunchScreen::new(RecordingPresenter::default());
    assert!(screen.is_launch_visible());

    let report = screen.present(seq).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(screen.phase(), LaunchPhase::AppVisible);
    assert!(!screen.is_launch_visible());

    let presenter = screen.into_presenter();
    assert_eq!(presenter.rendered.first().map(String::as_str), Some("idle"));
    assert!(presenter.saw("busy"));
    assert_eq!(presenter.rendered.last().map(String::as_str), Some("idle"));
    assert_eq!(presenter.done, 1);
    assert!(presenter.failures.is_empty());
}

#[tokio::test]
async fn test_failure_shows_the_error_screen() {
    let log = CallLog::new();
    let seq = StepSequencer::new(vec![
        ScriptedStep::boxed("fetch", true, Behavior::Fail("timeout"), &log),
        ScriptedStep::boxed("after", true, Behavior::Succeed, &log),
    ]);

    let mut screen = LaunchScreen::new(RecordingPresenter::default());
    let err = screen.present(seq).await.unwrap_err();

    assert_eq!(err.step(), "fetch");
    assert_eq!(screen.phase(), LaunchPhase::Failed);
    assert!(screen.is_launch_visible());
    assert!(screen.failure().is_some_and(|f| f.contains("timeout")));

    let presenter = screen.presenter();
    assert_eq!(presenter.rendered.last().map(String::as_str), Some("routed:error"));
    assert_eq!(presenter.failures.len(), 1);
    assert_eq!(presenter.done, 0);
    assert!(!log.was_reached("after"));
}

#[tokio::test]
async fn test_force_update_parks_the_launch() {
    let mut config = LaunchConfig::default();
    config.flags.force_update = true;
    let flags: Arc<dyn FlagSource> = Arc::new(config.flags.clone());
    let seq = StepSequencer::new(default_steps(&config, flags));

    let mut screen = LaunchScreen::new(RecordingPresenter::default());
    let report = screen.present(seq).await.unwrap();

    assert_eq!(
        report.outcome,
        PipelineOutcome::Halted {
            step: "force-update".to_string(),
            route: RouteKind::NeedsUpdate,
        }
    );
    assert_eq!(report.records.len(), 1);
    assert_eq!(screen.phase(), LaunchPhase::Halted);
    assert_eq!(screen.halted_on(), Some(RouteKind::NeedsUpdate));

    let presenter = screen.presenter();
    assert!(presenter.saw("routed:needs_update"));
    assert_eq!(presenter.done, 0);
    assert!(!presenter.saw("busy"));
}

#[tokio::test(start_paused = true)]
async fn test_presenter_can_press_the_call_to_action() {
    let log = CallLog::new();
    let seq = StepSequencer::new(vec![
        ScriptedStep::boxed("onboarding", true, Behavior::WaitForUser, &log),
        ScriptedStep::boxed("fetch", true, Behavior::Busy(Duration::from_millis(50)), &log),
    ]);

    let mut screen = LaunchScreen::new(RecordingPresenter::auto_resuming());
    screen.present(seq).await.unwrap();

    let presenter = screen.presenter();
    assert!(presenter.saw("routed:call_to_action"));
    assert_eq!(presenter.done, 1);
    assert_eq!(log.runs_of("fetch"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_default_pipeline_with_onboarding() {
    let config = LaunchConfig::default();
    let flags: Arc<dyn FlagSource> = Arc::new(config.flags.clone());
    let seq = StepSequencer::new(default_steps(&config, flags));

    let mut screen = LaunchScreen::new(RecordingPresenter::auto_resuming());
    let report = screen.present(seq).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(report.ran().count(), 4);
    assert_eq!(report.skipped().count(), 1);
    assert_eq!(screen.phase(), LaunchPhase::AppVisible);

    let presenter = screen.presenter();
    assert!(presenter.saw("busy"));
    assert!(presenter.saw("routed:finished"));
    assert!(presenter.saw("routed:call_to_action"));
    assert_eq!(presenter.rendered.last().map(String::as_str), Some("idle"));
    assert_eq!(presenter.done, 1);
}
