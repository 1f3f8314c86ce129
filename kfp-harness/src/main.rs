//! KFP Harness CLI
//!
//! Command-line interface for checking a pipeline end to end against a
//! Kubeflow-Pipelines style service.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, Connection, handle_command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kfp-harness")]
#[command(about = "End-to-end pipeline run harness", long_about = None)]
struct Cli {
    /// Pipeline service URL
    #[arg(
        long,
        env = "PIPELINE_SERVER_URL",
        default_value = "http://localhost:8888"
    )]
    server_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "BEARER_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kfp_harness=info,kfp_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let connection = Connection {
        server_url: cli.server_url,
        token: cli.token,
    };

    handle_command(cli.command, &connection).await
}
