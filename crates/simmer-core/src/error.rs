//! Error types for the simmer readiness gate

/// Result type alias using [`WaitError`]
pub type Result<T, E = WaitError> = std::result::Result<T, E>;

/// Fatal conditions that end a wait.
///
/// The display strings are part of the tool's observable output and are kept
/// stable: downstream pipelines grep for them.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The overall wall-clock timeout elapsed before the endpoint was ready
    #[error("timed out")]
    Timeout,

    /// The wait was cancelled externally (usually ctrl-c)
    #[error("cancelled, ceasing wait")]
    Cancelled,

    /// Expected content never appeared before the stream ended
    #[error("no content match")]
    NoMatch,

    /// Expected content never appeared within the per-I/O timeout
    #[error("no content match within iotimeout")]
    NoMatchTimeout,

    /// The probe request could not be constructed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unrecoverable I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
