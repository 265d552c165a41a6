//! # Simmer Wait
//!
//! The polling engine behind the simmer readiness gate:
//! - The [`Waiter`] trait: one readiness check per call
//! - [`wait`]: the cancellable polling loop that drives a waiter on a
//!   backoff schedule and streams one [`Status`](simmer_core::Status) per
//!   attempt
//! - [`HttpWaiter`]: HTTP response validation (status code + body content)
//! - [`TcpWaiter`]: TCP connect, optional write, streaming content match

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod http;
pub mod tcp;
pub mod waiter;

mod matcher;
mod net;

pub use http::HttpWaiter;
pub use tcp::TcpWaiter;
pub use waiter::{wait, Waiter};
