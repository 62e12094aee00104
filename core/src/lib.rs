//! Raw HTTP/1.1 over plain TCP.
//!
//! # Overview
//! Serializes a `RequestDescriptor` into HTTP/1.1 wire bytes by hand, writes
//! them on a fresh TCP connection, and returns every byte the server sends
//! until it closes the connection. The response is never parsed: status line,
//! headers and body come back as one string, exactly as received.
//!
//! # Design
//! - `encode` is pure and deterministic; it never touches the network.
//! - `TransportSession` owns one connection for one exchange and is consumed
//!   by `send`, or split into `open` and `PendingResponse::receive`. No
//!   pooling, no keep-alive, no retries.
//! - The socket is reached through the `Connector` trait so tests can replay
//!   scripted chunk sequences without a real server.
//! - Completion is signalled only by the peer closing the connection. Send
//!   `Connection: close` to servers that would otherwise keep it open, or set
//!   `SessionOptions::idle_timeout`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), rawhttp_core::ClientError> {
//! use rawhttp_core::RequestDescriptor;
//!
//! let descriptor = RequestDescriptor::new("example.com", "GET")
//!     .with_path("/")
//!     .with_header("Connection", "close");
//! let response = rawhttp_core::send(&descriptor).await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod error;
pub mod http;
pub mod session;

pub use encoder::{encode, request_target};
pub use error::ClientError;
pub use http::{Headers, RequestDescriptor, DEFAULT_PORT};
pub use session::{
    Connector, PendingResponse, ResponseResult, SessionOptions, SessionState, TcpConnector,
    TransportSession,
};

/// Send `descriptor` over a new TCP connection with default options.
pub async fn send(descriptor: &RequestDescriptor) -> ResponseResult {
    TransportSession::new().send(descriptor).await
}
