//! Error types for encoding and sending a request.
//!
//! # Design
//! Every failure is terminal for the request it belongs to; nothing here is
//! retried. Socket failures carry the underlying `io::Error` as their source
//! so callers can inspect the native error kind.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::session::SessionState;

/// Errors returned by `encode` and `TransportSession::send`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required descriptor field was empty.
    #[error("invalid request: {0}")]
    InvalidDescriptor(&'static str),

    /// The hostname cannot form the base URL `http://{hostname}`.
    #[error("invalid hostname {hostname:?}: {source}")]
    InvalidHostname {
        hostname: String,
        #[source]
        source: url::ParseError,
    },

    /// The path cannot be resolved against the base URL.
    #[error("invalid path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// Name resolution failed or the connection was refused.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("connecting to {host}:{port} timed out after {after:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        after: Duration,
    },

    #[error("failed to write request: {0}")]
    Write(#[source] io::Error),

    /// The connection failed mid-response. Bytes received so far are dropped.
    #[error("failed to read response: {0}")]
    Read(#[source] io::Error),

    #[error("no response data received for {after:?}")]
    ReadTimeout { after: Duration },
}

impl ClientError {
    /// The session state the failure happened in, or `None` when the
    /// descriptor was rejected before a connection was attempted.
    pub fn state(&self) -> Option<SessionState> {
        match self {
            ClientError::InvalidDescriptor(_)
            | ClientError::InvalidHostname { .. }
            | ClientError::InvalidPath { .. } => None,
            ClientError::Connect { .. } | ClientError::ConnectTimeout { .. } => {
                Some(SessionState::Connecting)
            }
            ClientError::Write(_) => Some(SessionState::Sending),
            ClientError::Read(_) | ClientError::ReadTimeout { .. } => {
                Some(SessionState::Receiving)
            }
        }
    }
}
