//! CONQUEST CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the multiplayer synchronization server
//! - map: Inspect the static territory catalog

use clap::{Parser, Subcommand};

mod map;
mod server;

#[derive(Parser)]
#[command(name = "conquest")]
#[command(about = "CONQUEST multiplayer game server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the multiplayer server
    Serve(server::ServerArgs),
    /// Print the territory catalog
    Map(map::MapArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Map(args) => map::run(args),
    }
}
