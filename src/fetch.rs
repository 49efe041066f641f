//! Conditional HTTP retrieval of feed documents.
//!
//! [`Fetch`] is the seam between the tracker and the network.  [`HttpFetcher`]
//! is the production implementation on top of [`reqwest`]: it replays the
//! cache validators from the previous successful fetch as `If-None-Match` /
//! `If-Modified-Since` and reports a `304` as [`FetchOutcome::Unchanged`].
//!
//! There are no retries here.  The next scheduled poll is the retry.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Cache validators from the last `200` response of one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl CacheValidators {
    /// Read `ETag` / `Last-Modified` from a response.  Absent headers clear
    /// the corresponding validator.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        Self {
            etag: get(ETAG),
            last_modified: get(LAST_MODIFIED),
        }
    }
}

/// Why a fetch produced nothing.  Only ever logged.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, refused connection, DNS failure, broken body stream.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with something other than 2xx / 304.
    #[error("HTTP error: {0}")]
    Status(StatusCode),

    /// Anything else, e.g. a URL the client refuses to build a request for.
    #[error("unexpected fetch error: {0}")]
    Other(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            FetchError::Other(e)
        } else {
            FetchError::Network(e)
        }
    }
}

/// Result of one conditional fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// `304 Not Modified`.  The caller keeps its validators.
    Unchanged,
    /// Fresh document plus the validators to replay next time.
    Content {
        body: Vec<u8>,
        validators: CacheValidators,
    },
    Failed(FetchError),
}

/// Something that can fetch a feed document conditionally.
///
/// The returned future must be cancel-safe: the tracker drops it when
/// shutdown is requested mid-fetch.
pub trait Fetch: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        validators: &CacheValidators,
    ) -> impl Future<Output = FetchOutcome> + Send;
}

/// [`Fetch`] over a dedicated [`reqwest::Client`].
///
/// Each tracker owns one; its connection pool is released when the fetcher
/// is dropped.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that enforces `timeout` on every request.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Other)?;
        Ok(Self { client })
    }

    async fn try_fetch(
        &self,
        url: &str,
        validators: &CacheValidators,
    ) -> Result<FetchOutcome, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("status-tracker/", env!("CARGO_PKG_VERSION")));
        if let Some(etag) = validators.etag.as_deref() {
            request = request.header(IF_NONE_MATCH, etag);
        }
        if let Some(modified) = validators.last_modified.as_deref() {
            request = request.header(IF_MODIFIED_SINCE, modified);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::Unchanged);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let validators = CacheValidators::from_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(FetchOutcome::Content { body, validators })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, validators: &CacheValidators) -> FetchOutcome {
        tracing::debug!("Fetching feed from: {}", url);
        self.try_fetch(url, validators)
            .await
            .unwrap_or_else(FetchOutcome::Failed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
