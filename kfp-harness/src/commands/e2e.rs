//! End-to-end command handler

use anyhow::Result;
use clap::{ArgAction, Args};
use colored::*;
use kfp_harness::config::{DEFAULT_PARAMS_PATH, is_enabled_value};
use kfp_harness::{E2eOutcome, HarnessConfig, run_pipeline_e2e};
use std::path::PathBuf;

use super::Connection;
use super::run::{WatchArgs, print_report};

/// Arguments of the `e2e` command
#[derive(Args, Debug)]
pub struct E2eArgs {
    /// Actually run; without this the command only reports a skip
    #[arg(
        long,
        env = "ENABLE_ILAB_PIPELINE_TEST",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_enabled
    )]
    enabled: bool,

    /// Pipeline display name
    #[arg(short, long, env = "PIPELINE_DISPLAY_NAME", default_value = "")]
    pipeline: String,

    /// YAML parameter file
    #[arg(long, env = "PIPELINE_PARAMS_FILE", default_value = DEFAULT_PARAMS_PATH)]
    params: PathBuf,

    /// Parameter overrides as KEY=value (repeatable)
    #[arg(short = 'P', long = "param")]
    param: Vec<String>,

    /// Display name for the run (defaults to the pipeline's)
    #[arg(long)]
    display_name: Option<String>,

    #[command(flatten)]
    watch: WatchArgs,
}

/// Same rule as the environment: only `true` enables, nothing is rejected
fn parse_enabled(value: &str) -> Result<bool, String> {
    Ok(is_enabled_value(value))
}

impl E2eArgs {
    fn into_config(self, connection: &Connection) -> HarnessConfig {
        let mut config = HarnessConfig::new(
            connection.server_url.clone(),
            connection.token.clone(),
            self.pipeline,
        )
        .with_enabled(self.enabled)
        .with_params_path(self.params)
        .with_watch(self.watch.into());

        config.param_overrides = self.param;
        config.run_display_name = self.display_name;
        config
    }
}

/// Handle the e2e command
pub async fn handle_e2e(args: E2eArgs, connection: &Connection) -> Result<()> {
    let config = args.into_config(connection);

    match run_pipeline_e2e(&config).await? {
        E2eOutcome::Skipped { reason } => {
            println!("{} {}", "⚠".yellow(), reason.yellow());
        }
        E2eOutcome::Succeeded {
            pipeline_id,
            run_id,
            report,
        } => {
            println!(
                "{} Pipeline {} ({}) run {} finished successfully",
                "✓".green().bold(),
                config.pipeline_display_name.cyan(),
                pipeline_id.dimmed(),
                run_id.cyan()
            );
            print_report(&report);
        }
    }

    Ok(())
}
