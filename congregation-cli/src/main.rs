//! congregation - site API server and content tools

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::admin::{run_collections, run_gallery, run_stats, CollectionsArgs, GalleryArgs, StatsArgs};
use commands::serve::{run_serve, ServeArgs};
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "congregation",
    version,
    about = "Congregation site API server and content tools"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Manage congregation statistics
    Stats(StatsArgs),
    /// Manage gallery images
    Gallery(GalleryArgs),
    /// List collection names in the database
    Collections(CollectionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await?,
        Commands::Stats(args) => run_stats(args).await?,
        Commands::Gallery(args) => run_gallery(args).await?,
        Commands::Collections(args) => run_collections(args).await?,
    }

    Ok(())
}
