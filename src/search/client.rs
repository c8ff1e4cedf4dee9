use crate::config::{is_known_engine, Config, SearchConfig};
use crate::fetch::{classify, RequestShaper, UserAgentPool, Verdict};
use crate::search::types::{SearchRequest, SearchResponse, WebSearchRequest};
use crate::SearchError;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for the remote web-search API
///
/// Requests carry the same shaped browser headers as page fetches, plus
/// the bearer token. There are no retries: a rate-limited or blocked
/// response is reported as-is.
pub struct SearchClient {
    client: Client,
    shaper: RequestShaper,
    user_agents: UserAgentPool,
    config: SearchConfig,
    delay: Option<(Duration, Duration)>,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        Self::with_shaper(config, RequestShaper::new())
    }

    pub fn with_shaper(config: &Config, shaper: RequestShaper) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.search.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let delay = config
            .fetch
            .user_agent_rotate
            .then(|| (config.fetch.delay_min(), config.fetch.delay_max()));

        Ok(Self {
            client,
            shaper,
            user_agents: UserAgentPool::new(config.user_agent.pool.clone()),
            config: config.search.clone(),
            delay,
        })
    }

    /// Engine a request will actually use
    pub fn resolve_engine<'a>(&'a self, request: &'a SearchRequest) -> &'a str {
        match request.search_engine.as_deref() {
            Some(engine) if is_known_engine(engine) => engine,
            Some(engine) => {
                tracing::warn!(
                    "Unknown search engine '{}', using {}",
                    engine,
                    self.config.search_engine
                );
                &self.config.search_engine
            }
            None => &self.config.search_engine,
        }
    }

    /// Runs one search
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | No token configured | `MissingToken` (no request sent) |
    /// | Blocked response | `Blocked` |
    /// | Rate-limited response | `RateLimited` |
    /// | Any other non-200 | `Status` with the body |
    /// | Undecodable body | `Decode` |
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        if self.config.api_token.trim().is_empty() {
            return Err(SearchError::MissingToken);
        }

        let body = WebSearchRequest {
            search_query: request.query.clone(),
            search_engine: self.resolve_engine(request).to_string(),
            search_intent: request.search_intent,
        };

        let user_agent = self.shaper.pick_user_agent(&self.user_agents);
        let mut headers = self.shaper.build_headers(&user_agent);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.api_token))
            .map_err(|_| SearchError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some((min, max)) = self.delay {
            if self.shaper.should_delay() {
                let delay = self.shaper.random_delay(min, max);
                tracing::debug!("Delaying {:?} before search", delay);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        tracing::debug!(
            "Searching '{}' with engine {}",
            body.search_query,
            body.search_engine
        );

        let send = self
            .client
            .post(&self.config.base_url)
            .headers(headers)
            .json(&body)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            response = send => response?,
        };

        let status = response.status().as_u16();
        match classify(status, response.headers()) {
            Verdict::Blocked => {
                tracing::warn!("Search request blocked with status {}", status);
                return Err(SearchError::Blocked { status });
            }
            Verdict::RateLimited => {
                tracing::warn!("Search request rate limited with status {}", status);
                return Err(SearchError::RateLimited { status });
            }
            Verdict::Success => {}
        }

        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            text = response.text() => text?,
        };

        if status != 200 {
            return Err(SearchError::Status { status, body: text });
        }

        let parsed: SearchResponse = serde_json::from_str(&text)?;
        tracing::info!(
            "Search returned {} results (request id {})",
            parsed.search_result.len(),
            parsed.request_id
        );

        Ok(parsed)
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("base_url", &self.config.base_url)
            .field("search_engine", &self.config.search_engine)
            .finish_non_exhaustive()
    }
}
