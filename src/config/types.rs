use crate::remote::RetryPolicy;
use serde::Deserialize;

/// Main configuration structure for tidewalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub remote: RemoteConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Worker-pool size; degenerate values are accepted and clamped
    #[serde(rename = "number-of-threads")]
    pub number_of_threads: i64,

    /// Whether an item-level failure is swallowed (true) or aborts the
    /// session's remaining submissions (false)
    #[serde(rename = "ignore-error", default)]
    pub ignore_error: bool,

    /// Comma-separated roles appended to every resource's role set
    #[serde(rename = "default-permissions", default)]
    pub default_permissions: String,

    /// How long a session drain waits before force-cancelling workers
    #[serde(rename = "shutdown-timeout-secs", default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout() -> u64 {
    60
}

impl CrawlConfig {
    /// Parses `default-permissions` into individual role tokens.
    pub fn default_roles(&self) -> Vec<String> {
        self.default_permissions
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Identity resolution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Capacity of each of the four identity caches
    #[serde(rename = "cache-size")]
    pub cache_size: usize,
}

/// Retry/backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Lower clamp for server-provided wait hints (milliseconds)
    #[serde(rename = "min-wait-ms", default = "default_min_wait")]
    pub min_wait_ms: u64,

    /// Upper clamp for server-provided wait hints (milliseconds)
    #[serde(rename = "max-wait-ms", default = "default_max_wait")]
    pub max_wait_ms: u64,

    /// Wait when the server provides no hint (milliseconds)
    #[serde(rename = "default-wait-ms", default = "default_default_wait")]
    pub default_wait_ms: u64,
}

fn default_min_wait() -> u64 {
    2_000
}

fn default_max_wait() -> u64 {
    15_000
}

fn default_default_wait() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_wait_ms: default_min_wait(),
            max_wait_ms: default_max_wait(),
            default_wait_ms: default_default_wait(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.min_wait_ms, self.max_wait_ms, self.default_wait_ms)
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the directory API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Name used in the user agent string
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version used in the user agent string
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

/// Credential configuration; the token may instead come from the
/// `TIDEWALK_TOKEN` environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(rename = "bearer-token", default)]
    pub bearer_token: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON-lines document file
    #[serde(rename = "documents-path")]
    pub documents_path: String,
}
