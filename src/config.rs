use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub view: ViewConfig,
}

/// Bounce analytics backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Completion and progress polling schedule
///
/// `max_attempts` and `deadline_seconds` of 0 disable that bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub not_found_delay_ms: u64,
    pub processing_delay_ms: u64,
    pub progress_interval_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
    pub max_attempts: u32,
    pub deadline_seconds: u64,
    pub track_progress: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            not_found_delay_ms: 3000,
            processing_delay_ms: 2000,
            progress_interval_ms: 1000,
            backoff_multiplier: 1.5,
            max_backoff_seconds: 30,
            max_attempts: 240,
            deadline_seconds: 1800,
            track_progress: true,
        }
    }
}

impl PollingConfig {
    /// Delay before re-polling a campaign the backend does not know yet
    pub fn not_found_delay(&self) -> Duration {
        Duration::from_millis(self.not_found_delay_ms)
    }

    /// Delay before re-polling a campaign that is still processing
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_seconds)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_seconds > 0).then(|| Duration::from_secs(self.deadline_seconds))
    }

    pub fn attempt_limit(&self) -> Option<u32> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }

    /// Fixed-interval schedule with no budget
    pub fn unbounded_fixed() -> Self {
        Self {
            backoff_multiplier: 1.0,
            max_attempts: 0,
            deadline_seconds: 0,
            ..Self::default()
        }
    }
}

/// Presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub default_threshold: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_threshold: 5.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let backend = BackendConfig::default();
        let polling = PollingConfig::default();
        let view = ViewConfig::default();
        let config = Config::builder()
            .set_default("backend.url", backend.url)?
            .set_default("backend.timeout_seconds", backend.timeout_seconds)?
            .set_default("polling.not_found_delay_ms", polling.not_found_delay_ms)?
            .set_default("polling.processing_delay_ms", polling.processing_delay_ms)?
            .set_default("polling.progress_interval_ms", polling.progress_interval_ms)?
            .set_default("polling.backoff_multiplier", polling.backoff_multiplier)?
            .set_default("polling.max_backoff_seconds", polling.max_backoff_seconds)?
            .set_default("polling.max_attempts", polling.max_attempts as i64)?
            .set_default("polling.deadline_seconds", polling.deadline_seconds)?
            .set_default("polling.track_progress", polling.track_progress)?
            .set_default("view.default_threshold", view.default_threshold)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // BOUNCE_POLLING__MAX_ATTEMPTS=10 style overrides
            .add_source(
                config::Environment::with_prefix("BOUNCE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Flat alias for the one setting everybody needs
        if let Ok(url) = env::var("BOUNCE_BACKEND_URL") {
            app_config.backend.url = url;
        }

        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "Backend URL not configured. Set BOUNCE_BACKEND_URL or backend.url in config.toml"
                    .to_string(),
            ));
        }
        if self.polling.backoff_multiplier < 1.0 {
            return Err(ConfigError::Message(format!(
                "polling.backoff_multiplier must be >= 1.0, got {}",
                self.polling.backoff_multiplier
            )));
        }
        if !(5.0..=95.0).contains(&self.view.default_threshold) {
            return Err(ConfigError::Message(format!(
                "view.default_threshold must be within 5..=95, got {}",
                self.view.default_threshold
            )));
        }
        Ok(())
    }
}
