//! Per-attempt status reporting

use crate::error::WaitError;

/// Outcome of one probe attempt, or of the wait as a whole.
///
/// A wait produces a stream of these: zero or more non-terminal statuses
/// (`done == false`, `error == None`) followed by exactly one terminal status,
/// after which the stream closes.
#[derive(Debug)]
pub struct Status {
    /// True iff no further attempts will occur
    pub done: bool,
    /// Human-readable description of the attempt outcome
    pub message: String,
    /// Present only for fatal conditions; `None` for "not ready yet"
    pub error: Option<WaitError>,
}

impl Status {
    /// Message emitted when the endpoint is ready
    pub const AVAILABLE: &'static str = "service available";

    /// Non-terminal "not ready yet" status
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            done: false,
            message: message.into(),
            error: None,
        }
    }

    /// Terminal success
    pub fn available() -> Self {
        Self {
            done: true,
            message: Self::AVAILABLE.to_string(),
            error: None,
        }
    }

    /// Terminal failure
    pub fn failed(error: WaitError) -> Self {
        Self {
            done: true,
            message: String::new(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_non_terminal() {
        let status = Status::pending("connection refused");
        assert!(!status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "connection refused");
    }

    #[test]
    fn test_available_is_terminal_success() {
        let status = Status::available();
        assert!(status.done);
        assert!(status.error.is_none());
        assert_eq!(status.message, "service available");
    }

    #[test]
    fn test_failed_is_terminal_error() {
        let status = Status::failed(WaitError::Timeout);
        assert!(status.done);
        assert!(matches!(status.error, Some(WaitError::Timeout)));
    }
}
