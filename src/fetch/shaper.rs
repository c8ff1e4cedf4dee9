//! Request shaping
//!
//! Builds browser-like header sets and resolves the per-attempt randomness
//! (user agent, pre-request delay, timeout jitter). All randomness comes from
//! one generator behind a mutex; the lock is only held for the draw itself.

use crate::fetch::user_agents::{UserAgentPool, FALLBACK_USER_AGENT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL,
    CONNECTION, DNT, REFERER, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7";
const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate, br";

/// Sec-Fetch-* values of a top-level, user-initiated navigation
const SEC_FETCH_HEADERS: &[(&str, &str)] = &[
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
];

const REFERERS: &[&str] = &[
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
];

const CACHE_CONTROL_PROBABILITY: f64 = 0.3;
const REFERER_PROBABILITY: f64 = 0.2;
const DELAY_PROBABILITY: f64 = 0.7;
const TIMEOUT_JITTER: f64 = 0.2;

/// Source of request-shaping randomness, safe to share across tasks
pub struct RequestShaper {
    rng: Mutex<StdRng>,
}

impl RequestShaper {
    /// Creates a shaper seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic shaper, for tests and reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Builds the outbound header set for one attempt
    ///
    /// Always sets the user agent, the Accept triple, DNT, Connection,
    /// Upgrade-Insecure-Requests and the four Sec-Fetch-* headers.
    /// Cache-Control (~30%) and Referer (~20%) are drawn independently on
    /// every call so repeated requests do not share a static signature.
    pub fn build_headers(&self, user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let ua = HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
            tracing::warn!("User agent is not a valid header value, using fallback");
            HeaderValue::from_static(FALLBACK_USER_AGENT)
        });
        headers.insert(USER_AGENT, ua);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING_VALUE));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        for (name, value) in SEC_FETCH_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let (cache_control, referer) = self.with_rng(|rng| {
            let cache_control = rng.gen_bool(CACHE_CONTROL_PROBABILITY);
            let referer = rng
                .gen_bool(REFERER_PROBABILITY)
                .then(|| REFERERS[rng.gen_range(0..REFERERS.len())]);
            (cache_control, referer)
        });

        if cache_control {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        }
        if let Some(referer) = referer {
            headers.insert(REFERER, HeaderValue::from_static(referer));
        }

        headers
    }

    /// Picks a user agent uniformly from the pool
    pub fn pick_user_agent(&self, pool: &UserAgentPool) -> String {
        if pool.is_empty() {
            return FALLBACK_USER_AGENT.to_string();
        }
        let index = self.with_rng(|rng| rng.gen_range(0..pool.len()));
        pool.get(index).to_string()
    }

    /// Decides whether to pause before a request (~70% of calls)
    pub fn should_delay(&self) -> bool {
        self.with_rng(|rng| rng.gen_bool(DELAY_PROBABILITY))
    }

    /// Returns a uniformly random delay in `[min, max)`, or `min` when the
    /// range is empty
    pub fn random_delay(&self, min: Duration, max: Duration) -> Duration {
        if min >= max {
            return min;
        }
        self.with_rng(|rng| rng.gen_range(min..max))
    }

    /// Perturbs the base timeout by up to ±20%
    pub fn jittered_timeout(&self, base: Duration) -> Duration {
        self.jitter(base, TIMEOUT_JITTER)
    }

    /// Scales `base` by a uniform factor in `[1 - fraction, 1 + fraction]`,
    /// never going below zero
    pub fn jitter(&self, base: Duration, fraction: f64) -> Duration {
        if fraction <= 0.0 || base.is_zero() {
            return base;
        }
        let offset = self.with_rng(|rng| rng.gen_range(-fraction..=fraction));
        base.mul_f64((1.0 + offset).max(0.0))
    }
}

impl Default for RequestShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestShaper").finish_non_exhaustive()
    }
}
