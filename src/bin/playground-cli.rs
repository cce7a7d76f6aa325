use std::process::ExitCode;

use clap::{Parser, Subcommand};
use playground_proxy::proxy::{ErrorPayload, HeaderEntry, RequestDescriptor, ResponseDescriptor};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "playground-cli")]
#[command(about = "Send requests through a running playground proxy", long_about = None)]
struct Cli {
    /// Base URL of the proxy
    #[arg(short, long, default_value = "http://localhost:3001")]
    proxy: String,

    /// Path of the proxy endpoint
    #[arg(long, default_value = "/api/proxy")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one request and print the response
    Send {
        /// GET, POST, PUT or DELETE
        method: String,
        /// Target URL
        url: String,
        /// Header as "Key: Value"; prefix with '!' to send it disabled
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<HeaderEntry>,
        /// Request body, ignored for GET
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let endpoint = format!("{}{}", cli.proxy.trim_end_matches('/'), cli.path);

    let Commands::Send {
        method,
        url,
        headers,
        body,
    } = cli.command;

    let descriptor = RequestDescriptor {
        url,
        method,
        headers,
        body,
    };

    match send(&endpoint, &descriptor).await {
        Ok(Outcome::Response(response)) => {
            print_response(&response);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Error(payload)) => {
            eprintln!("{}: {}", payload.kind, payload.message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: could not reach proxy at {endpoint}: {e}");
            ExitCode::FAILURE
        }
    }
}

enum Outcome {
    Response(ResponseDescriptor),
    Error(ErrorPayload),
}

async fn send(
    endpoint: &str,
    descriptor: &RequestDescriptor,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let res = reqwest::Client::new()
        .post(endpoint)
        .json(descriptor)
        .send()
        .await?;

    if res.status().is_success() {
        Ok(Outcome::Response(res.json().await?))
    } else {
        Ok(Outcome::Error(res.json().await?))
    }
}

fn print_response(response: &ResponseDescriptor) {
    println!(
        "{} {}  ({} ms)",
        response.status, response.status_text, response.response_time_ms
    );
    for (name, value) in &response.headers {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", render_body(&response.body));
}

/// Pretty-print JSON bodies, pass everything else through.
fn render_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body.to_string())
}

fn parse_header(raw: &str) -> Result<HeaderEntry, String> {
    let (enabled, raw) = match raw.strip_prefix('!') {
        Some(rest) => (false, rest),
        None => (true, raw),
    };
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Key: Value\", got {raw:?}"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err("header name is empty".into());
    }
    let value = value.trim();

    Ok(if enabled {
        HeaderEntry::new(key, value)
    } else {
        HeaderEntry::disabled(key, value)
    })
}
