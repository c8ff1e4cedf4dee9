//! Fetch orchestration
//!
//! This module owns the end-to-end attempt loop:
//! - Validating the target URL before any network I/O
//! - The optional randomized pre-request delay
//! - Shaped GET requests with a jittered per-attempt timeout
//! - Retry logic driven by the response classifier
//! - Body decompression and hand-off to the extractor

use crate::config::{Config, FetchConfig};
use crate::extract::{extract_page, ExtractLimits, ExtractOptions, PageContent};
use crate::fetch::classifier::{classify_response, retry_delay, ClassifiedResponse};
use crate::fetch::decompress::decompress_body;
use crate::fetch::shaper::RequestShaper;
use crate::fetch::transport::{
    HttpTransport, OutboundRequest, ReqwestTransport, TransportError, TransportResponse,
};
use crate::fetch::user_agents::UserAgentPool;
use crate::url::validate_fetch_url;
use crate::{FetchError, FetchResult, UrlError};
use reqwest::header::{HeaderMap, CONTENT_ENCODING, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Total attempts per fetch, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// A single page fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub include_links: bool,
    pub include_images: bool,

    /// Used for every attempt instead of a pick from the pool
    pub user_agent: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Values resolved for one iteration of the retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based
    pub number: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Outcome of one attempt, local to its loop iteration
enum AttemptOutcome {
    Done(TransportResponse),
    Retry(Duration),
}

/// Fetches pages and distills them into [`PageContent`]
///
/// The transport is shared across concurrent fetches; everything
/// per-request (headers, timeout, user agent) is built fresh for each
/// attempt.
pub struct WebFetcher<T: HttpTransport = ReqwestTransport> {
    transport: T,
    shaper: RequestShaper,
    user_agents: UserAgentPool,
    config: FetchConfig,
}

impl WebFetcher<ReqwestTransport> {
    /// Creates a fetcher backed by a pooled reqwest client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use web_distill::{Config, FetchRequest, WebFetcher};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = WebFetcher::new(&Config::default())?;
    /// let page = fetcher.fetch(&FetchRequest::new("https://example.com")).await?;
    /// println!("{}", page.title);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_transport(
            ReqwestTransport::new()?,
            config,
            RequestShaper::new(),
        ))
    }
}

impl<T: HttpTransport> WebFetcher<T> {
    pub fn with_transport(transport: T, config: &Config, shaper: RequestShaper) -> Self {
        Self {
            transport,
            shaper,
            user_agents: UserAgentPool::new(config.user_agent.pool.clone()),
            config: config.fetch.clone(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches and extracts a page without external cancellation
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult<PageContent> {
        self.fetch_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Fetches and extracts a page
    ///
    /// # Request Flow
    ///
    /// 1. Validate the URL (no network call on failure)
    /// 2. Optionally sleep a random delay when rotation is enabled
    /// 3. Up to [`MAX_ATTEMPTS`] shaped GET requests
    /// 4. Decompress and extract the successful response
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Blocked | Immediate → `Blocked` |
    /// | Rate limited | Retry after `Retry-After` or backoff |
    /// | Transport failure | Retry after backoff |
    /// | Budget exhausted | `RateLimited` or `Transport` |
    ///
    /// Every sleep and network call races `cancel`; once it fires the loop
    /// returns [`FetchError::Cancelled`] without further attempts.
    pub async fn fetch_with_cancel(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> FetchResult<PageContent> {
        let url = validate_fetch_url(&request.url).map_err(|e| match e {
            UrlError::Parse(reason) => FetchError::InvalidUrl {
                url: request.url.clone(),
                reason,
            },
            UrlError::InvalidScheme(scheme) => FetchError::UnsupportedScheme { scheme },
        })?;

        if self.config.user_agent_rotate && self.shaper.should_delay() {
            let delay = self
                .shaper
                .random_delay(self.config.delay_min(), self.config.delay_max());
            tracing::debug!("Delaying {:?} before requesting {}", delay, url);
            sleep_or_cancel(delay, cancel).await?;
        }

        let response = self.request_with_retries(&url, request, cancel).await?;
        self.build_page(request, &url, response)
    }

    async fn request_with_retries(
        &self,
        url: &Url,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> FetchResult<TransportResponse> {
        for number in 1..=MAX_ATTEMPTS {
            let attempt = self.next_attempt(number, request);
            tracing::debug!(
                "Attempt {}/{} for {} (timeout {:?}, user agent {})",
                attempt.number,
                MAX_ATTEMPTS,
                url,
                attempt.timeout,
                attempt.user_agent
            );

            let outbound = OutboundRequest {
                url: url.clone(),
                headers: self.shaper.build_headers(&attempt.user_agent),
                timeout: attempt.timeout,
            };

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.transport.get(outbound) => result,
            };

            let last = number == MAX_ATTEMPTS;
            match self.evaluate(url, number, result, last)? {
                AttemptOutcome::Done(response) => return Ok(response),
                AttemptOutcome::Retry(wait) => {
                    tracing::debug!("Retrying {} in {:?}", url, wait);
                    sleep_or_cancel(wait, cancel).await?;
                }
            }
        }

        // The last iteration always returns from `evaluate`
        Err(FetchError::Transport {
            attempts: MAX_ATTEMPTS,
            message: "retry budget exhausted".to_string(),
        })
    }

    fn next_attempt(&self, number: u32, request: &FetchRequest) -> FetchAttempt {
        let user_agent = match &request.user_agent {
            Some(ua) => ua.clone(),
            None => self.shaper.pick_user_agent(&self.user_agents),
        };

        FetchAttempt {
            number,
            timeout: self.shaper.jittered_timeout(self.config.timeout()),
            user_agent,
        }
    }

    fn evaluate(
        &self,
        url: &Url,
        number: u32,
        result: Result<TransportResponse, TransportError>,
        last: bool,
    ) -> FetchResult<AttemptOutcome> {
        let response = match result {
            Ok(response) => response,
            Err(TransportError::Decode(message)) => {
                tracing::warn!("Response from {} could not be decoded: {}", url, message);
                return Err(FetchError::Decompression(message));
            }
            Err(e) => {
                tracing::warn!("Attempt {} for {} failed: {}", number, url, e);
                if last {
                    return Err(FetchError::Transport {
                        attempts: MAX_ATTEMPTS,
                        message: e.to_string(),
                    });
                }
                return Ok(AttemptOutcome::Retry(retry_delay(None, number, &self.shaper)));
            }
        };

        match classify_response(response.status, &response.headers, number, &self.shaper) {
            ClassifiedResponse::Success { .. } => Ok(AttemptOutcome::Done(response)),
            ClassifiedResponse::Blocked { status, waf } => {
                let waf = waf.map(|w| w.as_str().to_string());
                tracing::warn!(
                    "Request to {} blocked with status {} (waf: {})",
                    url,
                    status,
                    waf.as_deref().unwrap_or("unknown")
                );
                Err(FetchError::Blocked { status, waf })
            }
            ClassifiedResponse::RateLimited {
                status,
                retry_after,
            } => {
                tracing::warn!(
                    "Attempt {} for {} rate limited with status {}",
                    number,
                    url,
                    status
                );
                if last {
                    Err(FetchError::RateLimited {
                        attempts: MAX_ATTEMPTS,
                        status: Some(status),
                    })
                } else {
                    Ok(AttemptOutcome::Retry(retry_after))
                }
            }
        }
    }

    fn build_page(
        &self,
        request: &FetchRequest,
        url: &Url,
        response: TransportResponse,
    ) -> FetchResult<PageContent> {
        let content_encoding = header_str(&response.headers, CONTENT_ENCODING.as_str());
        let body = decompress_body(response.body, content_encoding.as_deref())?;
        let html = String::from_utf8_lossy(&body);

        let options = ExtractOptions {
            include_links: request.include_links,
            include_images: request.include_images,
        };
        let mut page = extract_page(&html, url, &ExtractLimits::from_config(&self.config), options)
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        page.url = request.url.clone();
        page.status_code = response.status;
        page.content_type = header_str(&response.headers, CONTENT_TYPE.as_str()).unwrap_or_default();
        page.headers = first_values(&response.headers);

        tracing::info!(
            "Fetched {} (status {}, {} bytes)",
            page.url,
            page.status_code,
            body.len()
        );

        Ok(page)
    }
}

impl<T: HttpTransport> std::fmt::Debug for WebFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebFetcher")
            .field("user_agents", &self.user_agents.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Sleeps for `duration` unless `cancel` fires first
async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> FetchResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// First value of each header, keyed by its (lowercase) name
fn first_values(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .filter_map(|name| {
            headers.get(name).map(|value| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
        })
        .collect()
}
