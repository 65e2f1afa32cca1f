//! HTTP retrieval of release assets.

mod client;

pub use client::{ByteStream, DEFAULT_TIMEOUT_SECS, Fetch, HttpClient, RetrievalOutcome};

#[cfg(test)]
pub use client::MockFetch;
