//! Remote directory API access
//!
//! This module owns everything that touches the wire: the HTTP client with
//! its status-code classification, the bounded retry/backoff policy for
//! transient failures, the opaque credential provider, and the typed wire
//! models for directory entities.

mod client;
mod credentials;
mod models;
mod retry;

pub use client::{build_http_client, RemoteClient};
pub use credentials::{CredentialProvider, StaticToken};
pub use models::{GroupRecord, SiteRecord, UserRecord};
pub use retry::RetryPolicy;
