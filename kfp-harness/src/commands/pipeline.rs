//! Pipeline command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use super::Connection;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List all pipelines
    List,
    /// Print the id of the pipeline with this display name
    Id {
        /// Exact, case-sensitive display name
        display_name: String,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(
    command: PipelineCommands,
    connection: &Connection,
) -> Result<()> {
    let client = connection.client();

    match command {
        PipelineCommands::List => {
            let pipelines = client.list_pipelines().await?;

            if pipelines.is_empty() {
                println!("{}", "No pipelines found.".yellow());
                return Ok(());
            }

            println!("{}", format!("Found {} pipeline(s):", pipelines.len()).bold());
            println!();
            for pipeline in pipelines {
                println!("  {} {}", "▸".cyan(), pipeline.display_name.bold());
                println!("    ID: {}", pipeline.id.dimmed());
            }
        }
        PipelineCommands::Id { display_name } => {
            let id = client.locate_pipeline(&display_name).await?;
            println!("{}", id);
        }
    }

    Ok(())
}
