//! Fetching activity data from the backend.
//!
//! [`client`] wraps the backend's REST API; [`worker`] runs fetches on
//! the async runtime and hands completed outcomes back to the
//! synchronous TUI loop over channels.

pub mod client;
pub mod worker;

pub use client::{ActivityClient, ClientError};
pub use worker::{FetchCommand, FetchLimits, FetchWorker, Outcome, Payload, RegistryAction};
