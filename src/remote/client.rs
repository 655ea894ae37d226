//! HTTP client for the directory API
//!
//! This module handles all remote requests for the engine, including:
//! - Building HTTP clients with proper user agent strings
//! - Bearer-token authentication via the opaque credential provider
//! - Status-code classification (transient / not-found / denied / other)
//! - Page fetches with `@odata.nextLink`-style continuation tokens

use crate::remote::credentials::CredentialProvider;
use crate::remote::models::{GroupRecord, UserRecord};
use crate::remote::retry::RetryPolicy;
use crate::walk::{Cursor, Page};
use crate::{Result, TideError};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler_name` - Name used in the user agent string
/// * `crawler_version` - Version used in the user agent string
pub fn build_http_client(
    crawler_name: &str,
    crawler_version: &str,
) -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", crawler_name, crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the remote directory API.
///
/// Single fetches go through the retry policy; page fetches additionally
/// translate the wire page shape (`value` array plus `@odata.nextLink`)
/// into [`Page`] values for the walker.
pub struct RemoteClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    retry: RetryPolicy,
}

impl RemoteClient {
    /// Creates a client against `base_url` (no trailing slash required).
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        retry: RetryPolicy,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credentials,
            retry,
        }
    }

    /// Resolves an API path against the base URL. Absolute URLs (such as
    /// continuation tokens) pass through unchanged.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Issues one GET and classifies the outcome. No retry at this level.
    async fn get_value(&self, url: &str) -> Result<Value> {
        let token = self.credentials.bearer_token()?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| TideError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                Err(TideError::Transient {
                    url: url.to_string(),
                    status: status.as_u16(),
                    retry_after: parse_retry_after(response.headers()),
                })
            }
            StatusCode::NOT_FOUND => Err(TideError::NotFound {
                url: url.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TideError::PermissionDenied {
                url: url.to_string(),
                status: status.as_u16(),
            }),
            s if s.is_success() => {
                response.json().await.map_err(|source| TideError::Http {
                    url: url.to_string(),
                    source,
                })
            }
            s => Err(TideError::UnexpectedStatus {
                url: url.to_string(),
                status: s.as_u16(),
            }),
        }
    }

    /// Fetches a single resource through the retry policy.
    ///
    /// Returns `Ok(None)` when the resource does not exist.
    pub async fn get_resource(&self, path: &str) -> Result<Option<Value>> {
        let url = self.endpoint(path);
        self.retry.call(|| self.get_value(&url)).await
    }

    /// Fetches one page of a collection.
    ///
    /// The empty cursor loads the first page at `path`; a non-empty cursor
    /// carries the URL-shaped continuation token verbatim. A deleted
    /// collection (404) yields an empty final page rather than an error,
    /// matching the skip semantics for resources that vanish between
    /// enumeration and fetch.
    pub async fn fetch_page(&self, path: &str, cursor: &Cursor) -> Result<Page<Value>> {
        let url = match cursor.token() {
            Some(token) => token.to_string(),
            None => self.endpoint(path),
        };

        let body = match self.retry.call(|| self.get_value(&url)).await? {
            Some(body) => body,
            None => {
                tracing::debug!(url = %url, "collection absent, ending walk");
                return Ok(Page::last(Vec::new()));
            }
        };

        parse_page(&url, body)
    }

    /// Fetches a user by id. `Ok(None)` when no such user exists.
    pub async fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        let path = format!("/v1.0/users/{}", id);
        match self.get_resource(&path).await? {
            Some(body) => {
                let user = serde_json::from_value(body).map_err(|e| TideError::Malformed {
                    url: self.endpoint(&path),
                    message: format!("user payload: {}", e),
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Fetches a group by id. `Ok(None)` when no such group exists.
    pub async fn get_group(&self, id: &str) -> Result<Option<GroupRecord>> {
        let path = format!("/v1.0/groups/{}", id);
        match self.get_resource(&path).await? {
            Some(body) => {
                let group = serde_json::from_value(body).map_err(|e| TideError::Malformed {
                    url: self.endpoint(&path),
                    message: format!("group payload: {}", e),
                })?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    /// Path of the full group collection.
    pub fn groups_path() -> &'static str {
        "/v1.0/groups"
    }

    /// Path of the top-level site collection.
    pub fn sites_path() -> &'static str {
        "/v1.0/sites"
    }

    /// Path of a resource's permission collection.
    pub fn permissions_path(resource_path: &str) -> String {
        format!("{}/permissions", resource_path.trim_end_matches('/'))
    }

    /// Probes the API with the configured credential.
    ///
    /// Any failure here is fatal: the session must abort before submitting
    /// work rather than fail item by item with a dead credential.
    pub async fn verify_credentials(&self) -> Result<()> {
        let url = self.endpoint(Self::sites_path());
        match self.get_value(&url).await {
            Ok(_) => Ok(()),
            Err(e) => Err(TideError::Fatal {
                message: format!("credential verification failed: {}", e),
            }),
        }
    }
}

/// Extracts a `Retry-After` seconds hint, if the server sent one.
fn parse_retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Translates a wire page body into a [`Page`] of raw JSON items.
fn parse_page(url: &str, body: Value) -> Result<Page<Value>> {
    let items = match body.get("value") {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(TideError::Malformed {
                url: url.to_string(),
                message: format!("expected array in \"value\", got {}", other),
            })
        }
        // Single-entity responses have no "value" wrapper.
        None => vec![body.clone()],
    };

    let next = body
        .get("@odata.nextLink")
        .and_then(Value::as_str)
        .map(Cursor::from_token)
        .unwrap_or_else(Cursor::end);

    Ok(Page { items, next })
}
