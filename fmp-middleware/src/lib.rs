//! fmp-middleware
//!
//! Wrappers that decorate a [`Transport`](fmp_core::Transport) while keeping
//! its interface, so they stack in front of the HTTP transport or a mock.
#![warn(missing_docs)]

mod retry;

pub use crate::retry::{RetryTransport, backoff_delay};
