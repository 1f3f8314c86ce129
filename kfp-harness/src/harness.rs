//! End-to-end pipeline run
//!
//! Locate the pipeline, trigger a run with the configured parameters, and
//! wait for it to succeed. The first error ends the flow.

use anyhow::{Context, Result};
use kfp_client::{KfpClient, WatchReport};
use tracing::info;

use crate::config::{ENABLE_ENV, HarnessConfig};

/// How an end-to-end invocation ended, when it did not fail
#[derive(Debug)]
pub enum E2eOutcome {
    /// The harness is disabled for this environment
    Skipped { reason: String },
    /// The run reached `SUCCEEDED`
    Succeeded {
        pipeline_id: String,
        run_id: String,
        report: WatchReport,
    },
}

impl E2eOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Run the pipeline end to end
///
/// A disabled configuration returns [`E2eOutcome::Skipped`] without touching
/// the network or the parameter file. Errors keep their
/// [`kfp_client::ClientError`] source, so callers can tell a failed run from
/// a timeout or a missing pipeline with `downcast_ref`.
pub async fn run_pipeline_e2e(config: &HarnessConfig) -> Result<E2eOutcome> {
    if !config.enabled {
        let reason = format!(
            "Skipping pipeline test. Set {}=true to enable.",
            ENABLE_ENV
        );
        info!("{}", reason);
        return Ok(E2eOutcome::Skipped { reason });
    }

    config.validate().context("Invalid harness configuration")?;
    let client = KfpClient::new(&config.server_url, &config.bearer_token);
    run_with_client(&client, config).await
}

/// Same flow as [`run_pipeline_e2e`] on an existing client
pub async fn run_with_client(client: &KfpClient, config: &HarnessConfig) -> Result<E2eOutcome> {
    let display_name = &config.pipeline_display_name;

    info!("Retrieving pipeline ID for display name: {}", display_name);
    let pipeline_id = client
        .locate_pipeline(display_name)
        .await
        .context("Failed to retrieve pipeline ID")?;

    info!("Loading pipeline parameters from {}", config.params_path.display());
    let parameters = config
        .load_parameters()
        .context("Error loading pipeline parameters")?;
    info!("Loaded {} parameter(s)", parameters.len());

    let run = client
        .trigger_run(&pipeline_id, config.run_display_name(), parameters)
        .await
        .context("Failed to trigger pipeline")?;
    info!(
        "Pipeline with name {} and run ID {} started",
        display_name, run.run_id
    );

    let report = client
        .wait_for_run(&run.run_id, config.watch)
        .await
        .context("Pipeline did not complete successfully")?;
    info!(
        "Pipeline with name {} and run ID {} finished successfully",
        display_name, run.run_id
    );

    Ok(E2eOutcome::Succeeded {
        pipeline_id,
        run_id: run.run_id,
        report,
    })
}
