//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod e2e;
mod pipeline;
mod run;

pub use e2e::E2eArgs;
pub use pipeline::PipelineCommands;
pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;
use kfp_client::KfpClient;
use std::time::Duration;

/// Where the service is and how to authenticate
#[derive(Debug, Clone)]
pub struct Connection {
    pub server_url: String,
    pub token: String,
}

impl Connection {
    pub fn client(&self) -> KfpClient {
        KfpClient::new(&self.server_url, &self.token)
    }
}

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline lookup
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Run management
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Locate, trigger and watch a pipeline run end to end
    E2e(E2eArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, connection: &Connection) -> Result<()> {
    match command {
        Commands::Pipeline { command } => {
            pipeline::handle_pipeline_command(command, connection).await
        }
        Commands::Run { command } => run::handle_run_command(command, connection).await,
        Commands::E2e(args) => e2e::handle_e2e(args, connection).await,
    }
}

/// Parse a human-readable, non-zero duration such as `90s` or `2h 10m`
fn parse_duration(s: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err("duration must be greater than 0".to_string());
    }
    Ok(duration)
}
