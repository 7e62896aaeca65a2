use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::launch::{Flag, FlagSource};

/// Main configuration structure for the launch sequence
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LaunchConfig {
    /// Which launch steps are enabled
    pub flags: FeatureFlags,
    /// Simulated work durations
    pub timings: TimingConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureFlags {
    /// Run the first simulated fetch
    pub fetch_one: bool,
    /// Flash the finished screen after the first fetch
    pub show_did_finish: bool,
    /// Show onboarding and wait for the user
    pub show_onboarding: bool,
    /// Run the second simulated fetch
    pub fetch_two: bool,
    /// Stop the launch on the needs-update screen
    pub force_update: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingConfig {
    pub fetch_one_ms: u64,
    pub did_finish_ms: u64,
    pub fetch_two_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or filter directive
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            fetch_one: true,
            show_did_finish: true,
            show_onboarding: true,
            fetch_two: true,
            force_update: false,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fetch_one_ms: 2000,
            did_finish_ms: 1400,
            fetch_two_ms: 1400,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl FlagSource for FeatureFlags {
    fn is_enabled(&self, flag: Flag) -> bool {
        match flag {
            Flag::FetchOne => self.fetch_one,
            Flag::ShowDidFinish => self.show_did_finish,
            Flag::ShowOnboarding => self.show_onboarding,
            Flag::FetchTwo => self.fetch_two,
            Flag::ForceUpdate => self.force_update,
        }
    }
}

impl LaunchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (app-init.toml, .app-init-rc)
    /// 3. Environment variables (APP_INIT_ prefix, `__` between sections)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`LaunchConfig::load`] with config files looked up in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join("app-init.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".app-init-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP_INIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let launch_config: LaunchConfig = config.try_deserialize()?;
        Ok(launch_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
