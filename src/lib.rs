//! Tidewalk: a directory crawl engine for multi-tenant content services
//!
//! This crate implements the shared traversal-and-resolution core used by
//! content crawlers against a paginated, rate-limited directory API: cursor
//! pagination, identity/permission resolution with bounded caches, and a
//! bounded concurrent processing pipeline with per-item failure isolation.

pub mod acl;
pub mod config;
pub mod identity;
pub mod output;
pub mod pool;
pub mod remote;
pub mod session;
pub mod walk;

use std::time::Duration;
use thiserror::Error;

/// Main error type for tidewalk operations
#[derive(Debug, Error)]
pub enum TideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Transient failure (HTTP {status}) for {url}")]
    Transient {
        url: String,
        status: u16,
        retry_after: Option<Duration>,
    },

    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Permission denied (HTTP {status}) for {url}")]
    PermissionDenied { url: String, status: u16 },

    #[error("Malformed entity at {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Fatal: {message}")]
    Fatal { message: String },

    #[error("Session aborted after a previous failure")]
    SessionAborted,

    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`TideError`], used by the retry policy and
/// the work pool to decide how a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rate limited or temporarily unavailable; retried once, then recorded.
    Transient,
    /// Resource missing between enumeration and fetch; skipped, not an error.
    NotFound,
    /// Credential lacks access to one resource; recorded, skipped.
    PermissionDenied,
    /// Unexpected or missing field on one remote entity; recorded per item.
    Malformed,
    /// Invalid credential/config at session start; aborts before any work.
    Fatal,
}

impl TideError {
    /// Returns the failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            TideError::Transient { .. } => ErrorClass::Transient,
            TideError::NotFound { .. } => ErrorClass::NotFound,
            TideError::PermissionDenied { .. } => ErrorClass::PermissionDenied,
            TideError::Malformed { .. } | TideError::Json(_) => ErrorClass::Malformed,
            TideError::Config(_) | TideError::Fatal { .. } => ErrorClass::Fatal,
            _ => ErrorClass::Malformed,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for tidewalk operations
pub type Result<T> = std::result::Result<T, TideError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use acl::{AccessEntry, GranteeKind, PermissionMapper, TENANT_EVERYONE_ROLE};
pub use config::Config;
pub use identity::{IdentityResolver, PrincipalKind};
pub use output::{Document, DocumentSink, FailureSink, Phase, StatsKey, StatsSink};
pub use pool::WorkPool;
pub use remote::{CredentialProvider, RemoteClient, RetryPolicy, StaticToken};
pub use session::CrawlSession;
pub use walk::{Cursor, Page, PageWalker};
