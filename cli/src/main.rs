//! `rawhttp`: type in an HTTP request field by field, send it over plain TCP,
//! and see the raw response.
//!
//! Interactive by default. With `--request FILE` it sends one descriptor read
//! from JSON and exits, non-zero if the request fails. Logs go to stderr and
//! are filtered by `RUST_LOG`, falling back to `--log-level`.

mod console;
mod repl;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rawhttp_core::SessionOptions;
use tracing_subscriber::EnvFilter;

use crate::console::Console;
use crate::repl::Settings;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Send hand-built HTTP/1.1 requests over plain TCP",
    long_about = None
)]
struct Args {
    /// Give up connecting after this many milliseconds (default: wait indefinitely)
    #[arg(long, value_name = "MS")]
    connect_timeout_ms: Option<u64>,

    /// Fail if the server sends nothing for this many milliseconds (default: wait indefinitely)
    #[arg(long, value_name = "MS")]
    idle_timeout_ms: Option<u64>,

    /// Send the request described in this JSON file once instead of prompting
    #[arg(long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// Do not print the encoded request before sending it
    #[arg(short, long)]
    quiet: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            options: SessionOptions {
                connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
                idle_timeout: self.idle_timeout_ms.map(Duration::from_millis),
            },
            echo_request: !self.quiet,
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let settings = args.settings();
    let mut console = Console::stdio();
    match &args.request {
        Some(path) => repl::send_file(&mut console, path, &settings).await,
        None => repl::run(&mut console, &settings).await,
    }
}
