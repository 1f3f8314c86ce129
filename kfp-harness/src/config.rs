//! Harness configuration
//!
//! Everything the end-to-end flow needs: where the service is, how to
//! authenticate, which pipeline to run with which parameters, and how long
//! to wait. The flow is disabled unless `enabled` is set explicitly.

use anyhow::Context;
use kfp_client::WatchConfig;
use kfp_core::ParameterSet;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that switches the harness on (`true` enables)
pub const ENABLE_ENV: &str = "ENABLE_ILAB_PIPELINE_TEST";

/// Whether a value of [`ENABLE_ENV`] switches the harness on
///
/// Only the exact string `true` does; anything else leaves it disabled.
pub fn is_enabled_value(value: &str) -> bool {
    value == "true"
}

/// Parameter file used when none is configured
pub const DEFAULT_PARAMS_PATH: &str = "resources/pipeline_params.yaml";

/// Harness configuration
#[derive(Clone)]
pub struct HarnessConfig {
    /// Whether the flow runs at all; a disabled harness is a skip, not a failure
    pub enabled: bool,

    /// Pipeline service base URL (e.g., "https://ds-pipeline-dspa.example.com")
    pub server_url: String,

    /// Pre-obtained bearer token
    pub bearer_token: String,

    /// Display name of the pipeline to run
    pub pipeline_display_name: String,

    /// Display name for the created run; defaults to the pipeline's
    pub run_display_name: Option<String>,

    /// YAML file holding the run parameters
    pub params_path: PathBuf,

    /// `KEY=value` overrides applied on top of the parameter file
    pub param_overrides: Vec<String>,

    /// Poll cadence and deadline for the run
    pub watch: WatchConfig,
}

impl HarnessConfig {
    /// Creates a disabled configuration with defaults
    pub fn new(
        server_url: impl Into<String>,
        bearer_token: impl Into<String>,
        pipeline_display_name: impl Into<String>,
    ) -> Self {
        Self {
            enabled: false,
            server_url: server_url.into(),
            bearer_token: bearer_token.into(),
            pipeline_display_name: pipeline_display_name.into(),
            run_display_name: None,
            params_path: PathBuf::from(DEFAULT_PARAMS_PATH),
            param_overrides: Vec::new(),
            watch: WatchConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - ENABLE_ILAB_PIPELINE_TEST (optional, `true` enables, default: disabled)
    /// - PIPELINE_SERVER_URL (required when enabled)
    /// - BEARER_TOKEN (required when enabled)
    /// - PIPELINE_DISPLAY_NAME (required when enabled)
    /// - PIPELINE_PARAMS_FILE (optional, default: resources/pipeline_params.yaml)
    /// - POLL_INTERVAL (optional, seconds, default: 60)
    /// - RUN_TIMEOUT (optional, seconds, default: 7800)
    ///
    /// Missing required variables are not an error here; [`validate`](Self::validate)
    /// reports them once the harness is known to be enabled.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let seconds = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        let mut config = Self::new(
            var("PIPELINE_SERVER_URL"),
            var("BEARER_TOKEN"),
            var("PIPELINE_DISPLAY_NAME"),
        )
        .with_enabled(is_enabled_value(&var(ENABLE_ENV)));

        if let Ok(path) = std::env::var("PIPELINE_PARAMS_FILE") {
            config.params_path = PathBuf::from(path);
        }
        if let Some(interval) = seconds("POLL_INTERVAL") {
            config.watch.poll_interval = interval;
        }
        if let Some(timeout) = seconds("RUN_TIMEOUT") {
            config.watch.timeout = timeout;
        }

        config
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_params_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.params_path = path.into();
        self
    }

    pub fn with_param_override(mut self, assignment: impl Into<String>) -> Self {
        self.param_overrides.push(assignment.into());
        self
    }

    pub fn with_run_display_name(mut self, name: impl Into<String>) -> Self {
        self.run_display_name = Some(name.into());
        self
    }

    pub fn with_watch(mut self, watch: WatchConfig) -> Self {
        self.watch = watch;
        self
    }

    /// Display name given to the triggered run
    pub fn run_display_name(&self) -> &str {
        self.run_display_name
            .as_deref()
            .unwrap_or(&self.pipeline_display_name)
    }

    /// Load the parameter file and apply overrides
    pub fn load_parameters(&self) -> anyhow::Result<ParameterSet> {
        let mut params = ParameterSet::from_yaml_file(&self.params_path)?;
        for assignment in &self.param_overrides {
            params
                .apply_override(assignment)
                .with_context(|| format!("Invalid override for {}", self.params_path.display()))?;
        }
        Ok(params)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("PIPELINE_SERVER_URL must be set");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        if self.bearer_token.is_empty() {
            anyhow::bail!("BEARER_TOKEN must be set");
        }

        if self.pipeline_display_name.is_empty() {
            anyhow::bail!("PIPELINE_DISPLAY_NAME must be set");
        }

        self.watch.validate()?;

        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("enabled", &self.enabled)
            .field("server_url", &self.server_url)
            .field("bearer_token", &"<redacted>")
            .field("pipeline_display_name", &self.pipeline_display_name)
            .field("run_display_name", &self.run_display_name)
            .field("params_path", &self.params_path)
            .field("param_overrides", &self.param_overrides)
            .field("watch", &self.watch)
            .finish()
    }
}
