//! HTTP fetcher with bounded retries
//!
//! All requests in one run share a single client, so cookies and keep-alive
//! connections persist across retries of the same URL and across sites.
//! Retry policy:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 200 | Return immediately |
//! | HTTP 404 | Terminal, no retry |
//! | HTTP 403 / 5xx / other non-200 | Retry, surfaced as `HTTP <code>` |
//! | Timeout | Retry, surfaced as a timeout |
//! | Connection failure | Retry, surfaced as a connection error |
//!
//! The delay between attempts grows linearly: base delay times the attempt
//! number. Retries are strictly sequential; concurrency never bypasses the
//! backoff for a single target.

use crate::config::FetchConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Browser-like user agent; several of the tracked shops answer 403 to
/// anything that self-identifies as a bot.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/121.0.0.0 Safari/537.36";

/// Classified fetch failure, surfaced on the scrape result after exhaustion
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP 404 Not Found")]
    NotFound,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// Response body text
    pub body: String,
}

/// Builds the shared HTTP client with browser-spoofing default headers
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("pl-PL,pl;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying fetcher shared by all strategies in one run
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher with its own client built from the config
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Fetches a URL with the default headers
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.get_with_headers(url, &[]).await
    }

    /// Fetches a URL, adding per-request headers on top of the defaults
    ///
    /// Attempts run strictly one after another with the configured delay.
    /// A 200 returns immediately; a 404 fails immediately; everything else
    /// is retried up to the bound and the last classification is returned.
    pub async fn get_with_headers(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
    ) -> Result<FetchedPage, FetchError> {
        let total_attempts = self.max_retries + 1;
        let mut last_error = FetchError::Other("no attempt made".to_string());

        for attempt in 1..=total_attempts {
            match self.try_get(url, extra_headers).await {
                Ok(page) => return Ok(page),
                Err(e @ FetchError::NotFound) => return Err(e),
                Err(e) => {
                    tracing::warn!("Attempt {}/{}: {} -> {}", attempt, total_attempts, url, e);
                    last_error = e;
                }
            }

            if attempt < total_attempts {
                let delay = self.retry_delay * attempt;
                tracing::debug!("Waiting {:?} before retrying {}", delay, url);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error)
    }

    async fn try_get(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
    ) -> Result<FetchedPage, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Other(format!("invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::Other(format!("invalid header value: {}", e)))?;
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }

        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_transport_error)?;

        Ok(FetchedPage { final_url, body })
    }
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}
