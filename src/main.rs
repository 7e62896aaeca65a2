use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use app_init::{
    default_steps, init_telemetry, screen_for, FlagSource, LaunchConfig, LaunchError, LaunchMetrics,
    LaunchScreen, PipelineOutcome, Presenter, ProgressState, ResumeHandle, Screen,
    ShutdownCoordinator, StepSequencer,
};

#[derive(Parser)]
#[command(name = "app-init")]
#[command(about = "Run the app launch sequence in the terminal")]
#[command(long_about = "Runs the configured launch steps one after another, rendering the launch \
                       screen as text. Steps are toggled through app-init.toml or APP_INIT_* \
                       environment variables.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the launch sequence (default)
    Run {
        /// Continue past onboarding without waiting for Enter
        #[arg(long, value_name = "MS", help = "Press the onboarding button automatically after MS milliseconds")]
        auto_continue_ms: Option<u64>,
        /// Print the launch report as JSON
        #[arg(long, help = "Print the launch report as JSON when the launch ends")]
        json: bool,
    },
    /// Print the resolved configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = LaunchConfig::load_env_file() {
        eprintln!("Ignoring .env file: {e}");
    }
    let config = LaunchConfig::load()?;

    let command = cli.command.unwrap_or(Commands::Run {
        auto_continue_ms: None,
        json: false,
    });

    match command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Run {
            auto_continue_ms,
            json,
        } => {
            init_telemetry(&config.observability)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(async {
                run_command(config, auto_continue_ms.map(Duration::from_millis), json).await
            });
            // A pending stdin read must not keep the process alive
            runtime.shutdown_background();
            result
        }
    }
}

async fn run_command(config: LaunchConfig, auto_continue: Option<Duration>, json: bool) -> Result<()> {
    let shutdown = Arc::new(ShutdownCoordinator::new());
    let signals = Arc::clone(&shutdown).install_signal_handlers();
    let metrics = Arc::new(LaunchMetrics::new());

    let flags: Arc<dyn FlagSource> = Arc::new(config.flags.clone());
    let sequencer = StepSequencer::new(default_steps(&config, flags))
        .with_cancellation(shutdown.token())
        .with_metrics(Arc::clone(&metrics));

    let mut screen = LaunchScreen::new(TerminalPresenter::new(auto_continue));
    let result = screen.present(sequencer).await;
    signals.abort();
    metrics.log_stats();

    let report = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if let PipelineOutcome::Halted { step, route } = &report.outcome {
        println!("Launch stopped by '{step}' on the {route} screen");
    } else if !screen.is_launch_visible() {
        println!("This is the app");
    }
    Ok(())
}

/// Renders launch screens as lines on stdout
struct TerminalPresenter {
    auto_continue: Option<Duration>,
}

impl TerminalPresenter {
    fn new(auto_continue: Option<Duration>) -> Self {
        Self { auto_continue }
    }

    fn wait_for_user(&self, resume: ResumeHandle) {
        match self.auto_continue {
            Some(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    resume.resume();
                });
            }
            None => {
                tokio::task::spawn_blocking(move || {
                    let mut line = String::new();
                    if std::io::stdin().read_line(&mut line).is_ok() {
                        resume.resume();
                    }
                });
            }
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, state: &ProgressState) {
        let screen = screen_for(state);
        println!("▸ {}", screen.headline());

        if let Some(label) = screen.action_label() {
            match self.auto_continue {
                Some(delay) => println!("  [{label}] (pressed automatically in {}ms)", delay.as_millis()),
                None => println!("  [{label}] (press Enter)"),
            }
        }
        if let Screen::CallToAction { resume } = screen {
            self.wait_for_user(resume);
        }
    }

    fn launch_done(&mut self) {
        println!("✅ Launch done");
    }

    fn launch_failed(&mut self, error: &LaunchError) {
        eprintln!("❌ Launch failed: {error}");
    }
}
