//! Response classification
//!
//! Maps a completed response to Success, RateLimited or Blocked, and
//! computes the wait before the next attempt. The heuristics here are
//! deliberately isolated from the retry loop in `fetcher`.

use crate::fetch::shaper::RequestShaper;
use reqwest::header::{HeaderMap, RETRY_AFTER, SERVER};
use std::time::Duration;

const RATE_LIMIT_STATUSES: &[u16] = &[429, 503, 509];

const RATE_LIMIT_HEADERS: &[&str] = &[
    "x-ratelimit-remaining",
    "x-rate-limit-remaining",
    "ratelimit-remaining",
    "retry-after",
];

const BLOCKING_STATUSES: &[u16] = &[403, 406, 418, 451];

/// Statuses a Cloudflare challenge page is served with
const CLOUDFLARE_CHALLENGE_STATUSES: &[u16] = &[403, 503];

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const BACKOFF_JITTER: f64 = 0.25;

/// Outcome of classifying a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    RateLimited,
    Blocked,
}

/// Web application firewall fingerprinted from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waf {
    Cloudflare,
    Sucuri,
}

impl Waf {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
            Self::Sucuri => "sucuri",
        }
    }
}

/// A classified response with the data the retry loop needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResponse {
    Success { status: u16 },
    RateLimited { status: u16, retry_after: Duration },
    Blocked { status: u16, waf: Option<Waf> },
}

impl ClassifiedResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status }
            | Self::RateLimited { status, .. }
            | Self::Blocked { status, .. } => *status,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Success { .. } => Verdict::Success,
            Self::RateLimited { .. } => Verdict::RateLimited,
            Self::Blocked { .. } => Verdict::Blocked,
        }
    }
}

/// Classifies a response from its status and headers
///
/// Blocking takes precedence, so a Cloudflare 503 challenge is terminal
/// instead of being retried as a plain 503.
///
/// Note: checking rate limiting first would retry a Cloudflare 503 and any
/// 403 carrying `Retry-After`. Keep this order when adjusting either check.
pub fn classify(status: u16, headers: &HeaderMap) -> Verdict {
    if is_blocked(status, headers) {
        Verdict::Blocked
    } else if is_rate_limited(status, headers) {
        Verdict::RateLimited
    } else {
        Verdict::Success
    }
}

/// Classifies a response and, when retryable, computes the wait before
/// attempt `attempt + 1`
pub fn classify_response(
    status: u16,
    headers: &HeaderMap,
    attempt: u32,
    shaper: &RequestShaper,
) -> ClassifiedResponse {
    match classify(status, headers) {
        Verdict::Success => ClassifiedResponse::Success { status },
        Verdict::Blocked => ClassifiedResponse::Blocked {
            status,
            waf: detect_waf(headers),
        },
        Verdict::RateLimited => ClassifiedResponse::RateLimited {
            status,
            retry_after: retry_delay(Some(headers), attempt, shaper),
        },
    }
}

/// Returns true for rate-limit statuses or any rate-limit header,
/// regardless of the header's value
pub fn is_rate_limited(status: u16, headers: &HeaderMap) -> bool {
    RATE_LIMIT_STATUSES.contains(&status)
        || RATE_LIMIT_HEADERS
            .iter()
            .any(|name| headers.contains_key(*name))
}

/// Returns true for hard blocking statuses, or a Cloudflare challenge
///
/// `Server: nginx`, `CF-Ray` and `X-Sucuri-ID` alone never block: plenty
/// of legitimate sites send them. They only feed [`detect_waf`].
pub fn is_blocked(status: u16, headers: &HeaderMap) -> bool {
    if BLOCKING_STATUSES.contains(&status) {
        return true;
    }

    CLOUDFLARE_CHALLENGE_STATUSES.contains(&status) && server_is(headers, "cloudflare")
}

/// Fingerprints the WAF in front of the site, for diagnostics
pub fn detect_waf(headers: &HeaderMap) -> Option<Waf> {
    if server_is(headers, "cloudflare") || headers.contains_key("cf-ray") {
        Some(Waf::Cloudflare)
    } else if headers.contains_key("x-sucuri-id") {
        Some(Waf::Sucuri)
    } else {
        None
    }
}

fn server_is(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(SERVER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}

/// Computes the wait before the next attempt
///
/// A numeric `Retry-After` (seconds) is honored up to the 30 second
/// backoff cap. Otherwise the wait is `min(attempt, 30)` seconds with ±25%
/// jitter. Transport failures pass `None` for the headers.
pub fn retry_delay(headers: Option<&HeaderMap>, attempt: u32, shaper: &RequestShaper) -> Duration {
    if let Some(delay) = headers.and_then(parse_retry_after) {
        return delay;
    }

    shaper.jitter(backoff(attempt), BACKOFF_JITTER)
}

/// Linear-in-attempt backoff capped at 30 seconds, before jitter
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt)).min(MAX_BACKOFF)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let seconds: f64 = value.trim().parse().ok()?;

    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds.min(MAX_BACKOFF.as_secs_f64())))
    } else {
        None
    }
}
