//! smallkv Server Binary
//!
//! Starts the TCP server for smallkv.

use std::sync::Arc;

use clap::Parser;
use smallkv::network::Server;
use smallkv::{Config, Dispatcher};
use tracing_subscriber::{fmt, EnvFilter};

/// smallkv Server
#[derive(Parser, Debug)]
#[command(name = "smallkv-server")]
#[command(about = "Tiny authenticated key-value and diagnostics server")]
#[command(version)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Shared secret key clients must present
    secret_key: u32,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Number of connection worker threads (1 = one connection at a time)
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Per-connection read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,smallkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("smallkv Server v{}", smallkv::VERSION);

    let config = Config::builder()
        .listen_addr(format!("{}:{}", args.host, args.port))
        .secret_key(args.secret_key)
        .workers(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let dispatcher = Arc::new(Dispatcher::from_config(&config));

    let server = match Server::bind(config, dispatcher) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
