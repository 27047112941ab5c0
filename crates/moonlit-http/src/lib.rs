//! Resilient HTTP client for the moonlit backend.
//!
//! - [`HttpTransport`] is the seam between retry logic and the wire; the
//!   production [`ReqwestTransport`] posts JSON with reqwest.
//! - [`ResilientRequester`] wraps any transport with exponential backoff and
//!   jitter driven by a [`RetryPolicy`](moonlit_core::RetryPolicy).
//! - [`BackendClient`] implements the core's `ChatPort` and `SpeechPort` on top
//!   of the requester.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
pub mod dto;
mod requester;
mod transport;

// ============================================================================
// Public API
// ============================================================================

pub use client::BackendClient;
pub use requester::ResilientRequester;
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tracing_subscriber as _;
