//! One TCP connection carrying one request/response exchange.
//!
//! # Design
//! `TransportSession::send` walks a fixed state machine:
//!
//! ```text
//! Connecting -> Sending -> Receiving -> Closed
//!      \            \           \
//!       +------------+-----------+--> Failed
//! ```
//!
//! The response is everything the peer sends until it closes the connection.
//! There is no framing, so a server that keeps the connection open keeps the
//! session waiting. `SessionOptions` can bound the connect and the gap between
//! chunks; both bounds are off by default.
//!
//! The session is consumed by `send`, or by `open` followed by
//! `PendingResponse::receive` when the caller wants to see the request once
//! it is on the wire. Connections are never reused.

use std::fmt;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, trace};

use crate::encoder::encode;
use crate::error::ClientError;
use crate::http::RequestDescriptor;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Full response text on success.
pub type ResponseResult = Result<String, ClientError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Sending,
    Receiving,
    Closed,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::Sending => "sending",
            SessionState::Receiving => "receiving",
            SessionState::Closed => "closed",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Opens the byte stream a session runs over.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}

/// Plain TCP via tokio. Name resolution is left to the OS resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

/// Optional time bounds. `None` means wait indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub connect_timeout: Option<Duration>,
    /// Longest wait for the next chunk (or close) while receiving.
    pub idle_timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct TransportSession<C = TcpConnector> {
    connector: C,
    options: SessionOptions,
    state: SessionState,
}

impl TransportSession<TcpConnector> {
    pub fn new() -> Self {
        Self::with_connector(TcpConnector)
    }
}

impl Default for TransportSession<TcpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> TransportSession<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            options: SessionOptions::default(),
            state: SessionState::Connecting,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Send `descriptor` and collect the response until the peer closes.
    ///
    /// The descriptor is encoded before connecting, so an invalid path fails
    /// without touching the network. On any failure the bytes received so
    /// far are discarded.
    pub async fn send(self, descriptor: &RequestDescriptor) -> ResponseResult {
        self.open(descriptor).await?.receive().await
    }

    /// Connect and write the encoded request, leaving the response unread.
    #[tracing::instrument(
        name = "session",
        skip_all,
        fields(
            host = %descriptor.hostname,
            port = descriptor.effective_port(),
            method = %descriptor.method,
        )
    )]
    pub async fn open(
        mut self,
        descriptor: &RequestDescriptor,
    ) -> Result<PendingResponse<C>, ClientError> {
        match self.write_request(descriptor).await {
            Ok((stream, request)) => {
                self.transition(SessionState::Receiving);
                Ok(PendingResponse {
                    session: self,
                    stream,
                    request,
                })
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn write_request(
        &mut self,
        descriptor: &RequestDescriptor,
    ) -> Result<(C::Stream, Vec<u8>), ClientError> {
        let wire = encode(descriptor)?;
        let mut stream = self
            .connect(&descriptor.hostname, descriptor.effective_port())
            .await?;

        self.transition(SessionState::Sending);
        stream.write_all(&wire).await.map_err(ClientError::Write)?;
        stream.flush().await.map_err(ClientError::Write)?;
        trace!(bytes = wire.len(), "request written");
        Ok((stream, wire))
    }

    async fn connect(&self, host: &str, port: u16) -> Result<C::Stream, ClientError> {
        let connecting = self.connector.connect(host, port);
        let connected = match self.options.connect_timeout {
            Some(after) => time::timeout(after, connecting)
                .await
                .map_err(|_| ClientError::ConnectTimeout {
                    host: host.to_string(),
                    port,
                    after,
                })?,
            None => connecting.await,
        };
        connected.map_err(|source| ClientError::Connect {
            host: host.to_string(),
            port,
            source,
        })
    }

    /// Read until end-of-stream, appending chunks in arrival order.
    async fn read_to_close(&self, stream: &mut C::Stream) -> Result<Vec<u8>, ClientError> {
        let mut response = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = stream.read(&mut chunk);
            let n = match self.options.idle_timeout {
                Some(after) => time::timeout(after, read)
                    .await
                    .map_err(|_| ClientError::ReadTimeout { after })?,
                None => read.await,
            }
            .map_err(ClientError::Read)?;

            if n == 0 {
                return Ok(response);
            }
            trace!(bytes = n, "chunk received");
            response.extend_from_slice(&chunk[..n]);
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.transition(SessionState::Failed);
        debug!(error = %err, "request failed");
        err
    }
}

/// A session whose request has been written and whose response is still
/// on the wire.
pub struct PendingResponse<C: Connector> {
    session: TransportSession<C>,
    stream: C::Stream,
    request: Vec<u8>,
}

impl<C: Connector> PendingResponse<C> {
    /// The exact bytes that were written.
    pub fn request(&self) -> &[u8] {
        &self.request
    }

    /// Wait for the peer to close and return everything it sent.
    #[tracing::instrument(name = "receive", skip_all)]
    pub async fn receive(mut self) -> ResponseResult {
        match self.session.read_to_close(&mut self.stream).await {
            Ok(raw) => {
                self.session.transition(SessionState::Closed);
                debug!(bytes = raw.len(), "response complete");
                Ok(String::from_utf8_lossy(&raw).into_owned())
            }
            Err(err) => Err(self.session.fail(err)),
        }
    }
}
