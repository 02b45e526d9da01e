//! smallkv CLI Client
//!
//! Command-line interface for interacting with a smallkv server.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use smallkv::Client;

/// smallkv CLI
#[derive(Parser, Debug)]
#[command(name = "smallkv-cli")]
#[command(about = "CLI for the smallkv server")]
#[command(version)]
struct Args {
    /// Server host name or address
    host: String,

    /// Server port
    port: u16,

    /// Shared secret key
    secret_key: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a variable
    Set {
        /// Variable name (at most 15 bytes)
        name: String,

        /// Value to store (at most 100 bytes)
        value: String,
    },

    /// Get a variable
    Get {
        /// Variable name
        name: String,
    },

    /// Checksum data on the server
    Digest {
        /// Data to checksum (at most 100 bytes)
        data: String,
    },

    /// Run a diagnostic command: inet, hosts or services
    Run {
        /// Command selector
        selector: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let client = Client::new(args.host, args.port, args.secret_key);

    let result = match &args.command {
        Commands::Set { name, value } => client.set(name, value.as_bytes()),
        Commands::Get { name } => client.get(name),
        Commands::Digest { data } => client.digest(data.as_bytes()),
        Commands::Run { selector } => client.run(selector),
    };

    match result {
        Ok(response) if response.is_success() => {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(response.data());
            if !response.is_empty() && !matches!(args.command, Commands::Run { .. }) {
                let _ = writeln!(stdout);
            }
            ExitCode::SUCCESS
        }
        Ok(response) => {
            eprintln!("failed (status {})", response.status().code());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
