//! # Simmer Core
//!
//! Foundational types for the simmer readiness gate:
//! - Per-attempt [`Status`] values and the terminal-status contract
//! - The [`WaitError`] taxonomy shared by every probe
//! - The jittered exponential [`Backoff`] schedule between attempts

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod backoff;
pub mod error;
pub mod status;

pub use backoff::Backoff;
pub use error::{Result, WaitError};
pub use status::Status;
