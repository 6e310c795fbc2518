//! Server command - start the multiplayer synchronization server

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use conquest_server::{run_server, ServerConfig};

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8100")]
    pub port: u16,

    /// Directory containing static files for the browser client
    #[arg(long, default_value = "client")]
    pub static_dir: PathBuf,

    /// Directory for durable session snapshots; in-memory only when omitted
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Run server command
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!("Starting CONQUEST server on port {}", config.port);

    start_server(config)
}

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        data_dir: args.data_dir.clone(),
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

/// Validate that static directory exists
fn validate_static_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_server_defaults() {
        let args = ServerArgs {
            port: 8100,
            static_dir: PathBuf::from("test_static"),
            data_dir: None,
        };

        let config = configure_server(&args).unwrap();
        assert_eq!(config.port, 8100);
        assert_eq!(config.static_dir, "test_static");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(&PathBuf::from("/nonexistent/path"));
        assert!(result.is_ok());
    }
}
