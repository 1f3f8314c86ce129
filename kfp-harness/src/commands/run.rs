//! Run command handlers
//!
//! Starting a run, querying its state once, and watching it to completion.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use kfp_client::{WatchConfig, WatchReport};
use kfp_core::ParameterSet;
use kfp_core::domain::run::{RunSnapshot, RunStatus};
use std::path::PathBuf;
use std::time::Duration;

use super::{Connection, parse_duration};

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Start a run of a pipeline looked up by display name
    Start {
        /// Pipeline display name
        #[arg(short, long)]
        pipeline: String,

        /// YAML parameter file
        #[arg(long)]
        params: Option<PathBuf>,

        /// Parameter overrides as KEY=value (repeatable)
        #[arg(short = 'P', long = "param")]
        param: Vec<String>,

        /// Display name for the run (defaults to the pipeline's)
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Show the current state of a run
    Status {
        /// Run ID
        run_id: String,
    },
    /// Poll a run until it finishes
    Watch {
        /// Run ID
        run_id: String,

        #[command(flatten)]
        watch: WatchArgs,
    },
}

/// Poll cadence flags shared by `run watch` and `e2e`
#[derive(clap::Args, Debug, Clone)]
pub struct WatchArgs {
    /// Time between status queries (e.g. 60s, 5m)
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub poll_interval: Duration,

    /// Give up after this long (e.g. 2h 10m)
    #[arg(long, default_value = "2h 10m", value_parser = parse_duration)]
    pub timeout: Duration,
}

impl From<WatchArgs> for WatchConfig {
    fn from(args: WatchArgs) -> Self {
        WatchConfig::new(args.poll_interval, args.timeout)
    }
}

/// Handle run commands
pub async fn handle_run_command(command: RunCommands, connection: &Connection) -> Result<()> {
    let client = connection.client();

    match command {
        RunCommands::Start {
            pipeline,
            params,
            param,
            display_name,
        } => {
            let mut parameters = match &params {
                Some(path) => ParameterSet::from_yaml_file(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => ParameterSet::new(),
            };
            for assignment in &param {
                parameters.apply_override(assignment)?;
            }

            let pipeline_id = client.locate_pipeline(&pipeline).await?;
            let run_name = display_name.as_deref().unwrap_or(&pipeline);
            let run = client
                .trigger_run(&pipeline_id, run_name, parameters)
                .await?;

            println!("{}", "✓ Run started".green().bold());
            println!("  Pipeline: {} ({})", pipeline.cyan(), pipeline_id.dimmed());
            println!("  Run ID:   {}", run.run_id.cyan());
        }
        RunCommands::Status { run_id } => {
            let snapshot = client.get_run(&run_id).await?;
            print_snapshot(&run_id, &snapshot);
        }
        RunCommands::Watch { run_id, watch } => {
            let report = client.wait_for_run(&run_id, watch.into()).await?;
            print_report(&report);
        }
    }

    Ok(())
}

/// Print one observation of a run
pub fn print_snapshot(run_id: &str, snapshot: &RunSnapshot) {
    println!("{}", "Run Details:".bold());
    println!("  ID:       {}", run_id.cyan());
    if let Some(name) = &snapshot.display_name {
        println!("  Name:     {}", name);
    }
    println!("  State:    {}", colorize_status(&snapshot.status));
    if let Some(created) = snapshot.created_at {
        println!("  Created:  {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(finished) = snapshot.finished_at {
        println!("  Finished: {}", finished.format("%Y-%m-%d %H:%M:%S"));

        if let Some(created) = snapshot.created_at {
            let duration = finished.signed_duration_since(created);
            println!("  Duration: {}s", duration.num_seconds());
        }
    }
    if let Some(error) = &snapshot.error_message {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print the outcome of a successful watch
pub fn print_report(report: &WatchReport) {
    println!(
        "{} Run {} {} after {} poll(s) ({}s)",
        "✓".green(),
        report.run_id.cyan(),
        colorize_status(&report.snapshot.status),
        report.polls,
        report.elapsed.as_secs()
    );
}

/// Colorize run status for display
fn colorize_status(status: &RunStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        RunStatus::Succeeded => status_str.green(),
        RunStatus::Failed => status_str.red(),
        RunStatus::Skipped | RunStatus::Paused => status_str.yellow(),
        RunStatus::Canceling | RunStatus::Canceled => status_str.dimmed(),
        RunStatus::Active(_) => status_str.cyan(),
    }
}
