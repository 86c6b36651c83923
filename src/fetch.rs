//! Bounded outbound HTTP. Every upstream request in the gateway goes
//! through [`Fetcher`], which enforces a wall-clock timeout on the whole
//! exchange. No retries here — retry policy belongs to callers.

use futures::StreamExt;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::GatewayError;

// Many origins reject UA-less requests outright.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("body exceeded {0} byte ceiling")]
    TooLarge(u64),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e)
        }
    }
}

/// Validate a user-supplied target URL before any network I/O:
/// absolute, `http(s)` scheme, with a host.
pub fn parse_target(raw: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(raw).map_err(|_| GatewayError::InvalidUrl(raw.into()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(GatewayError::InvalidUrl(raw.into())),
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Issue one bounded request. The client timeout is the cancellation
    /// timer: it covers connect, headers, and body read.
    pub async fn fetch(&self, method: Method, url: &Url) -> Result<FetchResult, FetchError> {
        let inner = self.client.request(method, url.clone()).send().await?;
        Ok(FetchResult { inner })
    }
}

/// A single upstream response: status, case-insensitive header access,
/// and exactly one body read (text or capped bytes).
pub struct FetchResult {
    inner: reqwest::Response,
}

impl FetchResult {
    /// Test-only constructor for exercising body-read paths without a
    /// live upstream.
    #[cfg(test)]
    pub(crate) fn from_inner(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Declared Content-Length, if the upstream sent one.
    pub fn declared_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Decode the body as text using the response charset.
    pub async fn text(self) -> Result<String, FetchError> {
        Ok(self.inner.text().await?)
    }

    /// Accumulate the body, aborting the instant `ceiling` is crossed —
    /// an undeclared-length response must never buffer unbounded data.
    pub async fn bytes_capped(self, ceiling: u64) -> Result<Vec<u8>, FetchError> {
        let mut buf: Vec<u8> = Vec::new();
        let mut stream = self.inner.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::from)?;
            if buf.len() as u64 + chunk.len() as u64 > ceiling {
                return Err(FetchError::TooLarge(ceiling));
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}
