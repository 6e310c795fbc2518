//! Example to run the CONQUEST server standalone
//!
//! Run with: cargo run -p conquest-server --example run_server

use conquest_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        port: 8100,
        static_dir: "client".to_string(),
        data_dir: Some("sessions".into()),
    };

    println!("Starting CONQUEST server on port {}", config.port);
    println!("Connect clients to ws://localhost:{}/ws", config.port);

    run_server(config).await
}
