//! # blogsync CLI
//!
//! Publishes a directory of Markdown pages to write.as.

mod client;
mod commands;
mod credentials;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    remote: commands::RemoteArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish pages to write.as
    Publish(commands::PublishArgs),

    /// Publish pages, then keep publishing them as they change
    Watch(commands::PublishArgs),

    /// Convert page metadata and bodies to the canonical format
    Convert(commands::ConvertArgs),

    /// List collections owned by the authenticated user
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Publish(args) => commands::publish(&cli.config, &cli.remote, &args).await,
        Commands::Watch(args) => commands::watch(&cli.config, &cli.remote, &args).await,
        Commands::Convert(args) => commands::convert(&cli.config, &args),
        Commands::Collections => commands::list_collections(&cli.remote).await,
    }
}
