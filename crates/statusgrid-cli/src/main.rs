use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "statusgrid",
    about = "Polls deployment status endpoints across a fleet and consolidates the results",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every configured target once, or repeatedly with --watch.
    ///
    /// Exits non-zero when any target could not be polled, so the
    /// command composes with scripts and CI gates.
    Poll {
        /// Path to the configuration file
        #[arg(short, long, default_value = "statusgrid.toml")]
        config: PathBuf,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
        /// Pause between watch polls (e.g. "30s")
        #[arg(long, default_value = "30s")]
        interval: String,
    },
    /// Check a configuration file without polling anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "statusgrid.toml")]
        config: PathBuf,
    },
    /// Write a starter statusgrid.toml
    Init {
        /// Where to write the file
        #[arg(short, long, default_value = "statusgrid.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("statusgrid=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Poll {
            config,
            format,
            watch,
            interval,
        } => commands::poll::run(&config, &format, watch, &interval).await,
        Commands::Validate { config } => commands::validate::run(&config),
        Commands::Init { path } => commands::init::run(&path),
    }
}
