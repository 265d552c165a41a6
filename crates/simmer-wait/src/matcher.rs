//! Incremental content matching over a byte stream
//!
//! Detects the expected bytes as early as possible without waiting for the
//! stream to end, while guaranteeing forward progress: the read deadline is
//! re-armed before every read, so a peer that trickles one byte per
//! `io_timeout − ε` cannot keep a wait alive indefinitely without the
//! content ever matching — any single gap longer than the deadline ends it.

use simmer_core::{Status, WaitError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::trace;

const READ_CHUNK: usize = 256;

/// Substring search over byte slices
pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Rolling substring matcher fed one chunk at a time.
///
/// Keeps a carry of the last `needle.len() - 1` bytes so matches spanning
/// chunk boundaries are found without buffering the whole stream.
#[derive(Debug)]
pub(crate) struct ContentMatcher {
    needle: Vec<u8>,
    carry: Vec<u8>,
}

impl ContentMatcher {
    pub(crate) fn new(needle: &[u8]) -> Self {
        Self {
            needle: needle.to_vec(),
            carry: Vec::with_capacity(needle.len().saturating_sub(1) + READ_CHUNK),
        }
    }

    /// Feed the next chunk; returns true once the needle has been seen
    pub(crate) fn push(&mut self, chunk: &[u8]) -> bool {
        self.carry.extend_from_slice(chunk);
        if contains(&self.carry, &self.needle) {
            return true;
        }

        // Only the tail can participate in a future cross-boundary match.
        let keep = self.needle.len().saturating_sub(1);
        if self.carry.len() > keep {
            self.carry.drain(..self.carry.len() - keep);
        }
        false
    }
}

/// Read from `stream` until the needle appears, the stream ends, or a single
/// read exceeds `io_timeout`. First outcome wins; the caller drops the
/// connection when this returns.
pub(crate) async fn match_stream<S>(stream: &mut S, needle: &[u8], io_timeout: Duration) -> Status
where
    S: AsyncRead + Unpin,
{
    let mut matcher = ContentMatcher::new(needle);
    let mut buf = [0u8; READ_CHUNK];

    loop {
        // Per-read deadline: re-armed on every iteration.
        match timeout(io_timeout, stream.read(&mut buf)).await {
            Err(_) => return Status::failed(WaitError::NoMatchTimeout),
            Ok(Err(err)) => return Status::failed(WaitError::Io(err)),
            Ok(Ok(0)) => return Status::failed(WaitError::NoMatch),
            Ok(Ok(n)) => {
                trace!(bytes = n, "read chunk");
                if matcher.push(&buf[..n]) {
                    return Status::available();
                }
            }
        }
    }
}
