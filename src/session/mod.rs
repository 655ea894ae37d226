//! Crawl session orchestration
//!
//! One session is one end-to-end crawl invocation: it owns the identity
//! caches and the worker pool, wires them to the caller's sinks, and
//! guarantees teardown (drain, cache clear, commit) on both the success
//! and the failure path.
//!
//! The session walks the top-level site collection sequentially, since
//! continuation tokens are inherently serial, and fans each entity out to
//! the pool, where role resolution and document assembly run in parallel.
//! Completion order across items is unspecified.

use crate::acl::PermissionMapper;
use crate::config::Config;
use crate::identity::IdentityResolver;
use crate::output::{Document, DocumentSink, FailureSink, Phase, StatsKey, StatsSink};
use crate::pool::WorkPool;
use crate::remote::{build_http_client, CredentialProvider, RemoteClient, SiteRecord};
use crate::walk::PageWalker;
use crate::{Result, TideError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// One crawl invocation over the configured directory.
pub struct CrawlSession {
    config: Arc<Config>,
    client: Arc<RemoteClient>,
    resolver: Arc<IdentityResolver>,
    mapper: Arc<PermissionMapper>,
    pool: WorkPool,
    documents: Arc<dyn DocumentSink>,
    stats: Arc<dyn StatsSink>,
}

impl CrawlSession {
    /// Wires up a session from configuration and the caller's collaborators.
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialProvider>,
        documents: Arc<dyn DocumentSink>,
        failures: Arc<dyn FailureSink>,
        stats: Arc<dyn StatsSink>,
    ) -> Result<Self> {
        let http = build_http_client(&config.remote.crawler_name, &config.remote.crawler_version)
            .map_err(|e| TideError::Fatal {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        let client = Arc::new(RemoteClient::new(
            http,
            config.remote.base_url.clone(),
            credentials,
            config.retry.policy(),
        ));
        let resolver = Arc::new(IdentityResolver::new(
            client.clone(),
            config.identity.cache_size,
        ));
        let mapper = Arc::new(PermissionMapper::new(
            client.clone(),
            resolver.clone(),
            config.crawl.default_roles(),
        ));
        let pool = WorkPool::new(
            config.crawl.number_of_threads,
            config.crawl.ignore_error,
            stats.clone(),
            failures,
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            resolver,
            mapper,
            pool,
            documents,
            stats,
        })
    }

    /// Runs the session to completion.
    ///
    /// Verifies the credential first; a dead credential aborts here,
    /// before any work is submitted. Teardown (pool drain, cache clear,
    /// sink commit) runs regardless of how the enumeration ends, and
    /// commit covers every document stored before a partial failure.
    ///
    /// When an item failure stopped intake, that failure is the session's
    /// error: the enumerator itself only ever observes the generic intake
    /// refusal.
    pub async fn run(&mut self) -> Result<()> {
        self.client.verify_credentials().await?;

        let started = std::time::Instant::now();
        let walk_result = self.enumerate_sites().await;

        let timeout = Duration::from_secs(self.config.crawl.shutdown_timeout_secs);
        let first_failure = self.pool.drain(timeout).await;
        self.resolver.clear();

        let commit_result = self.documents.commit();

        let crawl_result = match first_failure {
            Some(cause) => Err(cause),
            None => walk_result.map(|_| ()),
        };

        match &crawl_result {
            Ok(()) => tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "crawl session complete"
            ),
            Err(e) => tracing::error!(error = %e, "crawl session ended with an error"),
        }

        crawl_result.and(commit_result)
    }

    /// Walks the site collection and submits one work item per site.
    ///
    /// Returns how many items were submitted. Stops early when the pool
    /// refuses intake after a failure with ignore-error off.
    async fn enumerate_sites(&self) -> Result<usize> {
        let client = self.client.clone();
        let mut walker = PageWalker::new(move |cursor| {
            let client = client.clone();
            async move { client.fetch_page(RemoteClient::sites_path(), &cursor).await }
        });

        let mut submitted = 0usize;
        while let Some(raw) = walker.next().await? {
            let provisional = raw
                .get("id")
                .and_then(Value::as_str)
                .map(|id| format!("site:{}", id))
                .unwrap_or_else(|| "site:unknown".to_string());
            let key = Arc::new(StatsKey::new(provisional));

            let task = process_site(
                self.mapper.clone(),
                self.documents.clone(),
                self.stats.clone(),
                key.clone(),
                raw,
            );
            self.pool.submit(key, task).await?;
            submitted += 1;
        }

        tracing::debug!(submitted, "site enumeration complete");
        Ok(submitted)
    }
}

/// Processes one site: resolve roles, assemble the document, store it.
///
/// Runs on a pool worker; every failure path surfaces as a `TideError` so
/// the pool can classify and record it against the stats key.
async fn process_site(
    mapper: Arc<PermissionMapper>,
    documents: Arc<dyn DocumentSink>,
    stats: Arc<dyn StatsSink>,
    key: Arc<StatsKey>,
    raw: Value,
) -> Result<()> {
    let site: SiteRecord = serde_json::from_value(raw).map_err(|e| TideError::Malformed {
        url: key.resource_url(),
        message: format!("site payload: {}", e),
    })?;

    if let Some(web_url) = &site.web_url {
        key.set_url(web_url);
    }

    let resource_path = format!("/v1.0/sites/{}", site.id);
    let roles = mapper.resolve_roles(&resource_path, &[]).await?;
    stats.record(&key, Phase::Evaluated);

    let document = Document::new(key.resource_url())
        .with_field("id", Value::String(site.id.clone()))
        .with_field("title", Value::String(site.label().to_string()))
        .with_roles(roles);

    documents.store(&document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CrawlConfig, CredentialsConfig, IdentityConfig, OutputConfig, RemoteConfig, RetryConfig,
    };
    use crate::output::MemorySink;
    use crate::remote::StaticToken;

    fn create_test_config(base_url: &str) -> Config {
        Config {
            crawl: CrawlConfig {
                number_of_threads: 2,
                ignore_error: true,
                default_permissions: String::new(),
                shutdown_timeout_secs: 5,
            },
            identity: IdentityConfig { cache_size: 100 },
            retry: RetryConfig {
                min_wait_ms: 1,
                max_wait_ms: 10,
                default_wait_ms: 2,
            },
            remote: RemoteConfig {
                base_url: base_url.to_string(),
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
            },
            credentials: CredentialsConfig::default(),
            output: OutputConfig {
                documents_path: "./documents.jsonl".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_session_construction() {
        let sink = Arc::new(MemorySink::new());
        let session = CrawlSession::new(
            create_test_config("https://api.example.com"),
            Arc::new(StaticToken::new("test-token")),
            sink.clone(),
            sink.clone(),
            sink,
        );
        assert!(session.is_ok());
    }
}
