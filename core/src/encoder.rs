//! HTTP/1.1 request serialization.
//!
//! # Design
//! Encoding is a pure function of the descriptor: no I/O and no hidden state,
//! so the same descriptor always yields the same bytes. The request target is
//! found by resolving `path` against `http://{hostname}` with WHATWG URL
//! rules, which accepts paths without a leading `/`, percent-encodes what
//! needs encoding, and drops any fragment.
//!
//! The `Host` header carries the hostname only, never the port.

use std::net::Ipv6Addr;

use url::Url;

use crate::error::ClientError;
use crate::http::RequestDescriptor;

const CRLF: &str = "\r\n";

/// Serialize `descriptor` into the exact bytes to write on the socket.
pub fn encode(descriptor: &RequestDescriptor) -> Result<Vec<u8>, ClientError> {
    let target = request_target(descriptor)?;

    let mut head = format!(
        "{} {target} HTTP/1.1{CRLF}Host: {}{CRLF}",
        descriptor.method, descriptor.hostname
    );
    for (name, value) in descriptor.headers.iter() {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str(CRLF);
    }
    if let Some(body) = &descriptor.body {
        head.push_str(&format!("Content-Length: {}{CRLF}", body.len()));
    }
    head.push_str(CRLF);

    let mut wire = head.into_bytes();
    if let Some(body) = &descriptor.body {
        wire.extend_from_slice(body.as_bytes());
    }
    Ok(wire)
}

/// The `{pathname}{search}` part of the request line.
///
/// `search` is omitted when the query is empty, so `/a?` becomes `/a`.
pub fn request_target(descriptor: &RequestDescriptor) -> Result<String, ClientError> {
    if descriptor.hostname.is_empty() {
        return Err(ClientError::InvalidDescriptor("hostname must not be empty"));
    }
    if descriptor.method.is_empty() {
        return Err(ClientError::InvalidDescriptor("method must not be empty"));
    }

    let url = base_url(&descriptor.hostname)?
        .join(&descriptor.path)
        .map_err(|source| ClientError::InvalidPath {
            path: descriptor.path.clone(),
            source,
        })?;

    let mut target = url.path().to_string();
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    Ok(target)
}

fn base_url(hostname: &str) -> Result<Url, ClientError> {
    // Bare IPv6 literals need brackets to sit in the authority.
    let authority = if hostname.parse::<Ipv6Addr>().is_ok() {
        format!("[{hostname}]")
    } else {
        hostname.to_string()
    };
    Url::parse(&format!("http://{authority}/")).map_err(|source| ClientError::InvalidHostname {
        hostname: hostname.to_string(),
        source,
    })
}
