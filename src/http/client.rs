//! Single-attempt HTTP retriever.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::debug;
use reqwest::{Client, StatusCode, header::HeaderMap};

/// Connect and per-read timeout applied to every request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("fetch-binary/", env!("CARGO_PKG_VERSION"));

/// Response body as a stream of chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Result of asking for one candidate.
pub enum RetrievalOutcome {
    /// Nothing installable here; the reason is only used for logging.
    Absent(String),
    /// Success status with a live body.
    Body(ByteStream),
}

impl fmt::Debug for RetrievalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalOutcome::Absent(reason) => f.debug_tuple("Absent").field(reason).finish(),
            RetrievalOutcome::Body(_) => f.write_str("Body(..)"),
        }
    }
}

/// Retrieves a URL once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> RetrievalOutcome;
}

/// reqwest-backed [`Fetch`]. No retries: a failed candidate is simply absent.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client whose connect and read operations give up after
    /// `timeout`, so one unreachable asset cannot stall the whole search.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Fetch for HttpClient {
    #[tracing::instrument(skip(self, headers))]
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> RetrievalOutcome {
        debug!("GET {}", url);

        let response = match self.client.get(url).headers(headers.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return RetrievalOutcome::Absent(format!("timed out: {}", e));
            }
            Err(e) => return RetrievalOutcome::Absent(format!("request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return RetrievalOutcome::Absent(format!("HTTP {}", status.as_u16()));
        }
        if status == StatusCode::NO_CONTENT {
            return RetrievalOutcome::Absent("response has no body".to_string());
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.context("Failed to read chunk from download stream"));
        RetrievalOutcome::Body(Box::pin(body))
    }
}
