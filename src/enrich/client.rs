//! Polite HTTP client for website enrichment.
//!
//! One client per run. It owns the `reqwest::Client`, enforces a minimum delay
//! between requests, retries transient failures with exponential backoff and
//! consults robots.txt (cached per origin) before every page fetch.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio_retry::RetryIf;
use url::Url;

use super::robots::{RobotsCache, RobotsRules};
use crate::config::{
    HttpConfig, HTTP_STATUS_FIRST_ERROR, HTTP_STATUS_NOT_FOUND, MAX_RESPONSE_BODY_SIZE,
    MAX_URL_LENGTH, ROBOTS_AGENT_TOKEN,
};
use crate::error_handling::{
    categorize_reqwest_error, categorize_status, get_retry_strategy, is_retriable, ErrorType,
};

/// Whether an https robots.txt answer warrants asking the plain-http origin.
///
/// Only a missing response or an error status other than 404 does; any
/// answer below 400 (an empty body included) is final.
fn needs_plain_http_retry(status: Option<u16>) -> bool {
    match status {
        None => true,
        Some(HTTP_STATUS_NOT_FOUND) => false,
        Some(s) => s >= HTTP_STATUS_FIRST_ERROR,
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,
    /// Response status
    pub status: u16,
    /// Body text, truncated to `MAX_RESPONSE_BODY_SIZE`
    pub body: String,
}

/// Why a fetch produced no page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchFailure {
    /// Failure category
    pub error: ErrorType,
    /// Final status, when a response arrived
    pub status: Option<u16>,
}

impl FetchFailure {
    fn new(error: ErrorType) -> Self {
        Self {
            error,
            status: None,
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.error, status),
            None => write!(f, "{}", self.error),
        }
    }
}

fn truncate_to_limit(mut body: String, limit: usize) -> String {
    if body.len() > limit {
        let mut cut = limit;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

/// Rate-limited, robots-aware HTTP client.
pub struct PoliteClient {
    client: Arc<reqwest::Client>,
    config: HttpConfig,
    /// User-Agent plus the robots token, lowercased at parse time
    robots_agent: String,
    last_request: Mutex<Option<Instant>>,
    robots: RobotsCache,
}

impl PoliteClient {
    /// Wraps a configured `reqwest::Client` (see `init_client`).
    pub fn new(client: Arc<reqwest::Client>, config: HttpConfig) -> Self {
        let robots_agent = format!("{} {}", config.user_agent, ROBOTS_AGENT_TOKEN);
        Self {
            client,
            config,
            robots_agent,
            last_request: Mutex::new(None),
            robots: RobotsCache::new(),
        }
    }

    /// Politeness settings in use.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// The run's robots.txt cache.
    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Waits until the minimum delay since the previous request has passed.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.request_delay {
                tokio::time::sleep(self.config.request_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Fetches a robots.txt body, returning the status (if any) and text.
    async fn fetch_robots_text(&self, robots_url: &str) -> (Option<u16>, String) {
        self.throttle().await;
        match self.client.get(robots_url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if status >= HTTP_STATUS_FIRST_ERROR {
                    return (Some(status), String::new());
                }
                let text = response.text().await.unwrap_or_default();
                (Some(status), text)
            }
            Err(e) => {
                debug!("robots.txt fetch failed for {}: {}", robots_url, e);
                (None, String::new())
            }
        }
    }

    async fn load_robots(&self, url: &Url) -> Arc<RobotsRules> {
        let origin = url.origin().ascii_serialization();
        if let Some(rules) = self.robots.get(&origin).await {
            return rules;
        }

        let (mut status, mut text) = self.fetch_robots_text(&format!("{origin}/robots.txt")).await;

        // Some school sites serve robots.txt only over plain http
        if url.scheme() == "https" && needs_plain_http_retry(status) {
            if let Some(host) = url.host_str() {
                let authority = match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                (status, text) = self
                    .fetch_robots_text(&format!("http://{authority}/robots.txt"))
                    .await;
            }
        }

        let rules = match status {
            Some(HTTP_STATUS_NOT_FOUND) => RobotsRules::allow_all(),
            Some(s) if s < HTTP_STATUS_FIRST_ERROR => RobotsRules::parse(&text, &self.robots_agent),
            _ => {
                warn!("robots.txt unreadable for {}, treating origin as disallowed", origin);
                RobotsRules::deny_all()
            }
        };
        self.robots.insert(&origin, rules).await
    }

    /// Checks robots.txt for `url`, fetching and caching it on first use.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let rules = self.load_robots(url).await;
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        rules.is_allowed(&path)
    }

    async fn attempt(&self, url: &Url) -> Result<FetchedPage, FetchFailure> {
        self.throttle().await;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchFailure::new(categorize_reqwest_error(&e)))?;

        let status = response.status().as_u16();
        if status >= HTTP_STATUS_FIRST_ERROR {
            return Err(FetchFailure {
                error: categorize_status(status),
                status: Some(status),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| FetchFailure {
            error: categorize_reqwest_error(&e),
            status: Some(status),
        })?;

        Ok(FetchedPage {
            url: final_url,
            status,
            body: truncate_to_limit(body, MAX_RESPONSE_BODY_SIZE),
        })
    }

    /// Fetches a page politely.
    ///
    /// Rejects malformed or non-http(s) URLs and robots-disallowed pages
    /// without sending a request. Rate limiting, server errors and transport
    /// failures are retried; any final status of 400 or above is a failure.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchFailure> {
        if url.len() > MAX_URL_LENGTH {
            return Err(FetchFailure::new(ErrorType::InvalidWebsiteUrl));
        }
        let parsed = Url::parse(url.trim())
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .ok_or_else(|| FetchFailure::new(ErrorType::InvalidWebsiteUrl))?;

        if !self.is_allowed(&parsed).await {
            info!("Blocked by robots.txt: {}", parsed);
            return Err(FetchFailure::new(ErrorType::RobotsDisallowed));
        }

        RetryIf::spawn(
            get_retry_strategy(self.config.max_retries),
            || self.attempt(&parsed),
            |failure: &FetchFailure| is_retriable(failure.error, failure.status),
        )
        .await
    }
}
