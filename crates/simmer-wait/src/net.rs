//! Shared connect-and-classify helper for the probe strategies

use std::io;
use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

/// A connect failure, classified by typed error inspection.
///
/// The variants carry the distinction the status messages need: resolution
/// failures and refused connections are ordinary "not ready yet" conditions,
/// anything else is handed back to the probe to decide.
#[derive(Debug)]
pub(crate) enum ConnectError {
    /// The host did not resolve to any address
    HostUnreachable,
    /// The endpoint actively refused the connection
    Refused,
    /// Any other I/O failure
    Other(io::Error),
}

impl ConnectError {
    fn classify(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable => {
                ConnectError::Refused
            }
            _ => ConnectError::Other(err),
        }
    }
}

/// Resolve `addr` (a `host:port` pair) and open a TCP connection to it.
pub(crate) async fn connect(addr: &str) -> Result<TcpStream, ConnectError> {
    let mut addrs = match lookup_host(addr).await {
        Ok(addrs) => addrs.peekable(),
        Err(err) => {
            debug!(addr = %addr, error = %err, "host resolution failed");
            return Err(ConnectError::HostUnreachable);
        }
    };
    if addrs.peek().is_none() {
        return Err(ConnectError::HostUnreachable);
    }

    let mut last_err = None;
    for resolved in addrs {
        match TcpStream::connect(resolved).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!(addr = %resolved, error = %err, "connect failed");
                last_err = Some(err);
            }
        }
    }

    // last_err is always set here: the address list was non-empty.
    match last_err {
        Some(err) => Err(ConnectError::classify(err)),
        None => Err(ConnectError::HostUnreachable),
    }
}
