//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Classifying responses (HTML page, non-HTML, bad status)
//! - Retrying connection failures and timeouts with backoff, up to a cap

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with an HTML body
    Page {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// 2xx response that is not HTML; not an error
    NotHtml {
        final_url: Url,
        content_type: String,
    },

    /// Response status outside 2xx
    HttpStatus { final_url: Url, status: u16 },

    /// No usable response; `attempts` requests were made
    Failed { error: String, attempts: u32 },
}

/// How network failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,
    /// Wait after the first failure; doubles per retry up to 8x
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_fetch_attempts.max(1),
            backoff: config.backoff(),
        }
    }

    /// Wait before the retry that follows failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(3);
        self.backoff.saturating_mul(1u32 << exponent)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed by the client (up to `max-redirects` hops); callers
/// compare the response's final URL against the requested one to see them.
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    config: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let redirect = if config.max_redirects == 0 {
        Policy::none()
    } else {
        Policy::limited(config.max_redirects as usize)
    };

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(config.fetch_timeout())
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues a single GET and classifies the response
///
/// Transport errors (including a timeout while reading the body) are returned
/// as `Err` so the caller can decide whether to retry.
pub async fn fetch_once(client: &Client, url: &Url) -> Result<FetchOutcome, reqwest::Error> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Ok(FetchOutcome::HttpStatus {
            final_url,
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return Ok(FetchOutcome::NotHtml {
            final_url,
            content_type,
        });
    }

    let body = response.text().await?;

    Ok(FetchOutcome::Page {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}

/// Fetches a URL, retrying connection failures and timeouts
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Connection error | Wait backoff, retry (up to `max_attempts`) |
/// | Timeout | Wait backoff, retry (up to `max_attempts`) |
/// | Any other transport error | Immediate → Failed |
/// | Non-2xx status | Immediate → HttpStatus |
///
/// The wait is a `tokio::time::sleep`, so a retrying task never blocks the
/// runtime threads serving other pages.
pub async fn fetch_with_retry(client: &Client, url: &Url, policy: &RetryPolicy) -> FetchOutcome {
    let mut attempt = 1;

    loop {
        match fetch_once(client, url).await {
            Ok(outcome) => return outcome,
            Err(e) if is_transient(&e) && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Client failed to fetch {} (attempt {}/{}), retrying after {:?}: {}",
                    url,
                    attempt,
                    policy.max_attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::warn!("Giving up on {} after {} attempt(s): {}", url, attempt, e);
                return FetchOutcome::Failed {
                    error: describe_error(&e),
                    attempts: attempt,
                };
            }
        }
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else {
        error.to_string()
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
