//! HTTP probe strategy: one request, validated status code and body content

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request, Uri};
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use simmer_core::{Status, WaitError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::matcher;
use crate::net::{self, ConnectError};
use crate::waiter::Waiter;

/// Waits for an HTTP endpoint to return the expected response.
///
/// One [`attempt`](Waiter::attempt) sends a single request and classifies the
/// outcome. Connection-level failures (refused, unresolvable host, transport
/// errors) and response mismatches (wrong status code, wrong body) are all
/// "not ready yet": the polling loop keeps retrying them until its timeout.
#[derive(Debug, Clone)]
pub struct HttpWaiter {
    /// Request method, e.g. `GET`
    pub method: String,
    /// Target URL (plain `http` only)
    pub url: String,
    /// Response status code that counts as ready
    pub expected_status: u16,
    /// Expected body content; `None` skips the body check
    pub content: Option<String>,
    /// Whether `content` must equal the whole body rather than appear in it
    pub entire_content: bool,
}

#[async_trait]
impl Waiter for HttpWaiter {
    async fn attempt(&self, cancel: &CancellationToken) -> Status {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Status::failed(WaitError::Cancelled),
            status = self.probe() => status,
        }
    }
}

impl HttpWaiter {
    async fn probe(&self) -> Status {
        let uri: Uri = match self.url.parse() {
            Ok(uri) => uri,
            Err(err) => return Status::failed(WaitError::InvalidRequest(err.to_string())),
        };
        let method = match Method::from_bytes(self.method.as_bytes()) {
            Ok(method) => method,
            Err(err) => return Status::failed(WaitError::InvalidRequest(err.to_string())),
        };
        if let Some(scheme) = uri.scheme_str() {
            if scheme != "http" {
                return Status::failed(WaitError::InvalidRequest(format!(
                    "unsupported scheme: {scheme}"
                )));
            }
        }
        let host = match uri.host() {
            Some(host) => host.to_string(),
            None => {
                return Status::failed(WaitError::InvalidRequest(
                    "url has no host".to_string(),
                ))
            }
        };
        let authority = format!("{host}:{}", uri.port_u16().unwrap_or(80));

        debug!(url = %self.url, method = %method, "probing");

        let stream = match net::connect(&authority).await {
            Ok(stream) => stream,
            Err(ConnectError::Refused) => return Status::pending("connection refused"),
            Err(ConnectError::HostUnreachable) => return Status::pending("could not reach host"),
            // Other transport errors are still retryable for HTTP; surface
            // the raw error text as the message.
            Err(ConnectError::Other(err)) => return Status::pending(err.to_string()),
        };

        let (mut sender, conn) = match http1::handshake(TokioIo::new(stream)).await {
            Ok(pair) => pair,
            Err(err) => return Status::pending(err.to_string()),
        };
        // The connection task ends when `sender` is dropped on any exit path.
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                debug!(error = %err, "connection closed");
            }
        });

        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let request = match Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, authority.as_str())
            .body(Empty::<Bytes>::new())
        {
            Ok(request) => request,
            Err(err) => return Status::failed(WaitError::InvalidRequest(err.to_string())),
        };

        let response = match sender.send_request(request).await {
            Ok(response) => response,
            Err(err) => return Status::pending(err.to_string()),
        };

        let status = response.status();
        if status.as_u16() != self.expected_status {
            let actual = match status.canonical_reason() {
                Some(reason) => format!("{} {reason}", status.as_u16()),
                None => status.as_u16().to_string(),
            };
            return Status::pending(format!(
                "status \"{actual}\" does not match expected status ({})",
                self.expected_status
            ));
        }

        if let Some(content) = &self.content {
            let body = match response.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(_) => return Status::pending("could not read body"),
            };

            if self.entire_content {
                if body.as_ref() != content.as_bytes() {
                    return Status::pending("response does not match content");
                }
            } else if !matcher::contains(&body, content.as_bytes()) {
                return Status::pending("response does not contain content");
            }
        }

        Status::available()
    }
}
