//! HTTP transport
//!
//! The fetch loop talks to the network through [`HttpTransport`] so the
//! transport can be swapped (tests use a counting spy). The production
//! implementation wraps one shared `reqwest::Client`; per-request state
//! (headers, timeout) travels in [`OutboundRequest`] and never mutates the
//! client.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// A fully shaped GET request for one attempt
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

/// A completed response with its body read to the end
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Transport-level failure: no usable response was received
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The body could not be decoded per its declared content encoding
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else if e.is_body() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Issues GET requests on behalf of the fetch loop
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Builds the shared HTTP client
///
/// No default user agent or timeout is set here: both are shaped per
/// attempt. Gzip is left to [`decompress_body`](super::decompress_body) so
/// declared and sniffed gzip fail the same way; brotli and deflate are
/// decoded by reqwest.
///
/// # Example
///
/// ```no_run
/// use web_distill::fetch::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(false)
        .brotli(true)
        .deflate(true)
        .build()
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(request.url)
            .headers(request.headers)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
