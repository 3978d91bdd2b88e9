use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Trust-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched per domain, root included
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Per-request timeout (milliseconds)
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Base wait between network retries (milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Attempts per page before a network failure becomes a failure record
    #[serde(default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Size of each domain's worker pool
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: u32,

    /// Number of domains crawled at the same time
    #[serde(default = "default_max_concurrent_domains")]
    pub max_concurrent_domains: u32,

    /// Wall-clock cap on a single domain's crawl (seconds); 0 disables it
    #[serde(default = "default_domain_deadline_secs")]
    pub domain_deadline_secs: Option<u64>,

    /// Redirect hops followed by the HTTP client
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn domain_deadline(&self) -> Option<Duration> {
        self.domain_deadline_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            backoff_ms: default_backoff_ms(),
            max_fetch_attempts: default_max_fetch_attempts(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_concurrent_domains: default_max_concurrent_domains(),
            domain_deadline_secs: default_domain_deadline_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_page_limit() -> u32 {
    10
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_backoff_ms() -> u64 {
    10_000
}

fn default_max_fetch_attempts() -> u32 {
    5
}

fn default_max_concurrent_fetches() -> u32 {
    4
}

fn default_max_concurrent_domains() -> u32 {
    8
}

fn default_domain_deadline_secs() -> Option<u64> {
    Some(900)
}

fn default_max_redirects() -> u32 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the two-column (name, url) seed list
    #[serde(rename = "seeds-path")]
    pub seeds_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Raw page records, one JSON object per line
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Consolidated domain → path → body mapping
    #[serde(rename = "consolidated-path")]
    pub consolidated_path: String,

    /// Failure records
    #[serde(rename = "errors-path")]
    pub errors_path: String,
}
