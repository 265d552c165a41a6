//! TCP probe strategy: connect, optionally write, then match streamed content

use async_trait::async_trait;
use simmer_core::{Status, WaitError};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::matcher;
use crate::net::{self, ConnectError};
use crate::waiter::Waiter;

/// Waits for a TCP endpoint, optionally writing a payload and matching the
/// response content.
///
/// Unlike the HTTP probe, a content mismatch here is terminal: once the
/// stream ends (or the I/O timeout fires) without the expected content, more
/// polling will not change the answer for a line-oriented service.
#[derive(Debug, Clone)]
pub struct TcpWaiter {
    /// Target `host:port`
    pub addr: String,
    /// Expected content; `None` makes connect success alone count as ready
    pub content: Option<String>,
    /// Payload written before reading; a trailing newline is added if absent
    pub write: Option<String>,
    /// Deadline for each individual read/write operation
    pub io_timeout: Duration,
    /// Whether `content` must equal the entire stream rather than appear in it
    pub entire_content: bool,
}

#[async_trait]
impl Waiter for TcpWaiter {
    async fn attempt(&self, cancel: &CancellationToken) -> Status {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Status::failed(WaitError::Cancelled),
            status = self.probe() => status,
        }
    }
}

impl TcpWaiter {
    async fn probe(&self) -> Status {
        debug!(addr = %self.addr, "probing");

        let mut stream = match net::connect(&self.addr).await {
            Ok(stream) => stream,
            Err(ConnectError::Refused) => return Status::pending("connection refused"),
            Err(ConnectError::HostUnreachable) => return Status::pending("could not reach host"),
            Err(ConnectError::Other(err)) => return Status::failed(WaitError::Io(err)),
        };

        if let Some(payload) = &self.write {
            // Add a newline to emulate the behavior of `echo | nc`.
            let mut payload = payload.clone();
            if !payload.ends_with('\n') {
                payload.push('\n');
            }
            match timeout(self.io_timeout, stream.write_all(payload.as_bytes())).await {
                Err(_) => {
                    return Status::failed(WaitError::Io(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "write timed out",
                    )))
                }
                Ok(Err(err)) => return Status::failed(WaitError::Io(err)),
                Ok(Ok(())) => {}
            }
        }

        let Some(content) = &self.content else {
            // Nothing to match and the connection opened.
            return Status::available();
        };

        if self.entire_content {
            let mut body = Vec::new();
            match timeout(self.io_timeout, stream.read_to_end(&mut body)).await {
                Err(_) => return Status::failed(WaitError::NoMatchTimeout),
                Ok(Err(err)) => return Status::failed(WaitError::Io(err)),
                Ok(Ok(_)) => {}
            }
            if body == content.as_bytes() {
                return Status::available();
            }
            return Status::failed(WaitError::NoMatch);
        }

        matcher::match_stream(&mut stream, content.as_bytes(), self.io_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const HALF: Duration = Duration::from_millis(500);

    fn waiter(addr: impl Into<String>) -> TcpWaiter {
        TcpWaiter {
            addr: addr.into(),
            content: None,
            write: None,
            io_timeout: HALF,
            entire_content: false,
        }
    }

    /// Accepts a single connection and writes `response`, then closes
    async fn one_shot_server(response: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(response).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_not_up_is_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let status = waiter(addr.to_string())
            .attempt(&CancellationToken::new())
            .await;
        assert!(!status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "connection refused");
    }

    #[tokio::test]
    async fn test_bad_host_is_unreachable() {
        let status = waiter("some.bad.hostname.invalid:80")
            .attempt(&CancellationToken::new())
            .await;
        assert!(!status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "could not reach host");
    }

    #[tokio::test]
    async fn test_connect_alone_is_available() {
        let addr = one_shot_server(b"").await;
        let status = waiter(addr.to_string())
            .attempt(&CancellationToken::new())
            .await;
        assert!(status.done);
        assert_eq!(status.message, "service available");
    }

    #[tokio::test]
    async fn test_entire_content_match_is_available() {
        let addr = one_shot_server(b"pong").await;
        let probe = TcpWaiter {
            content: Some("pong".to_string()),
            entire_content: true,
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "service available");
    }

    // The TCP side of the documented asymmetry: an exact-content mismatch is
    // terminal here, while the HTTP probe keeps retrying it.
    #[tokio::test]
    async fn test_entire_content_mismatch_is_terminal() {
        let addr = one_shot_server(b"not pong").await;
        let probe = TcpWaiter {
            content: Some("pong".to_string()),
            entire_content: true,
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert!(matches!(status.error, Some(WaitError::NoMatch)));
    }

    #[tokio::test]
    async fn test_partial_content_match_is_available() {
        let addr = one_shot_server(b"pong etc").await;
        let probe = TcpWaiter {
            content: Some("pong".to_string()),
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "service available");
    }

    #[tokio::test]
    async fn test_partial_content_mismatch_is_terminal() {
        let addr = one_shot_server(b"ping").await;
        let probe = TcpWaiter {
            content: Some("pong".to_string()),
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert!(matches!(status.error, Some(WaitError::NoMatch)));
    }

    #[tokio::test]
    async fn test_stalled_peer_times_out() {
        // One byte, then silence without closing.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"p").await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let probe = TcpWaiter {
            content: Some("pong".to_string()),
            io_timeout: Duration::from_millis(100),
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert!(matches!(status.error, Some(WaitError::NoMatchTimeout)));
    }

    #[tokio::test]
    async fn test_write_appends_exactly_one_newline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            tx.send(received).unwrap();
        });

        let probe = TcpWaiter {
            write: Some("ping".to_string()),
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);
        assert_eq!(status.message, "service available");

        let received = rx.await.unwrap();
        assert_eq!(received, b"ping\n");
    }

    #[tokio::test]
    async fn test_write_does_not_double_newline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            tx.send(received).unwrap();
        });

        let probe = TcpWaiter {
            write: Some("ping\n".to_string()),
            ..waiter(addr.to_string())
        };

        let status = probe.attempt(&CancellationToken::new()).await;
        assert!(status.done);

        let received = rx.await.unwrap();
        assert_eq!(received, b"ping\n");
    }
}
