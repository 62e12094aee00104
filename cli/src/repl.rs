//! The request loop: prompt, send, print, ask again.
//!
//! Knows nothing about sockets or wire encoding beyond the public
//! `RequestDescriptor` / `TransportSession` contract.

use std::path::Path;

use anyhow::Context;
use rawhttp_core::{RequestDescriptor, SessionOptions, TransportSession};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info};

use crate::console::Console;

#[derive(Debug, Clone, Copy, Default)]
pub struct Settings {
    pub options: SessionOptions,
    /// Print the encoded request once it has been written.
    pub echo_request: bool,
}

/// Prompt for requests until the user declines or input ends.
///
/// A failed request, including an out-of-range port answer, is reported on
/// the error stream and never ends the loop.
pub async fn run<R, W, E>(console: &mut Console<R, W, E>, settings: &Settings) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    loop {
        let Some(answers) = console.collect_descriptor().await? else {
            break;
        };

        let outcome = match answers {
            Ok(descriptor) => exchange(console, &descriptor, settings).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = outcome {
            debug!(error = %err, "request failed");
            console.complain(&format!("Error: {err}")).await?;
        }

        if !console
            .confirm("Do you want to make another request? (y/n): ")
            .await?
        {
            break;
        }
    }
    Ok(())
}

/// Send the request described in a JSON file once.
pub async fn send_file<R, W, E>(
    console: &mut Console<R, W, E>,
    path: &Path,
    settings: &Settings,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let descriptor: RequestDescriptor = serde_json::from_str(&raw)
        .with_context(|| format!("parsing request descriptor in {}", path.display()))?;
    exchange(console, &descriptor, settings).await
}

async fn exchange<R, W, E>(
    console: &mut Console<R, W, E>,
    descriptor: &RequestDescriptor,
    settings: &Settings,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    info!(host = %descriptor.hostname, port = descriptor.effective_port(), "sending request");
    let pending = TransportSession::new()
        .with_options(settings.options)
        .open(descriptor)
        .await?;
    if settings.echo_request {
        let wire = String::from_utf8_lossy(pending.request()).into_owned();
        console.say(&format!("Request: {wire}")).await?;
    }

    let response = pending.receive().await?;
    console.say(&format!("Response: {response}")).await?;
    Ok(())
}
