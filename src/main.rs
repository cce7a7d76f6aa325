//! API playground proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser                  ┌──────────────────────────────────────────────┐
//!   POST /api/proxy          │                PLAYGROUND PROXY              │
//!   ─────────────────────────┼─▶ http ──▶ validator ──▶ executor ──────────┼──▶ Target API
//!                            │   server    (url, scheme,  (headers,         │
//!   { status, headers,       │              private host,  deadline,        │
//!     body, responseTime }   │              method)        size cap)        │
//!   ◀────────────────────────┼── response ◀─────────────────────────────────┼───
//!                            │                                              │
//!                            │  config (TOML, hot reload) · observability   │
//!                            │  lifecycle (startup, signals, shutdown)      │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use playground_proxy::lifecycle::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "playground-proxy")]
#[command(about = "Server-side proxy for the API response playground", long_about = None)]
struct Args {
    /// Path to a TOML config file; watched for changes
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let options = StartupOptions {
        config_path: args.config,
        bind_override: args.bind,
    };

    match lifecycle::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("playground-proxy: {e}");
            ExitCode::FAILURE
        }
    }
}
