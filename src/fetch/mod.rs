//! Page fetching with browser-like request shaping
//!
//! This module contains the network half of the pipeline:
//! - `shaper`: header sets, user-agent picks, delay and timeout jitter
//! - `classifier`: Success / RateLimited / Blocked verdicts and retry waits
//! - `transport`: the `HttpTransport` seam and its reqwest implementation
//! - `fetcher`: the attempt loop tying them together

mod classifier;
mod decompress;
mod fetcher;
mod shaper;
mod transport;
mod user_agents;

pub use classifier::{
    backoff, classify, classify_response, detect_waf, is_blocked, is_rate_limited, retry_delay,
    ClassifiedResponse, Verdict, Waf,
};
pub use decompress::{decompress_body, is_gzip};
pub use fetcher::{FetchAttempt, FetchRequest, WebFetcher, MAX_ATTEMPTS};
pub use shaper::RequestShaper;
pub use transport::{
    build_http_client, HttpTransport, OutboundRequest, ReqwestTransport, TransportError,
    TransportResponse,
};
pub use user_agents::{default_user_agents, UserAgentPool, FALLBACK_USER_AGENT};
