//! Principal classification and canonical-name resolution
//!
//! Four independent caches, each loaded on miss through the remote client
//! (which already carries the retry policy):
//! - principal kind: user fetch; 404 implies group, any other failure
//!   implies unknown
//! - group ids by email: a full group enumeration filtered by mail, the
//!   one genuinely expensive loader, cached to avoid repeating the walk
//! - canonical user name: principal name, else mail
//! - canonical group name: mail, else alias, else display name
//!
//! The caches are shared read/write across all workers of one session.
//! Concurrent misses on the same key may run the loader twice; the design
//! accepts that race instead of serializing lookups on per-key locks.

use crate::identity::cache::BoundedCache;
use crate::remote::{GroupRecord, RemoteClient};
use crate::walk::PageWalker;
use crate::Result;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// What kind of principal an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalKind {
    User,
    Group,
    /// Classification failed; logged, not retried for the session.
    Unknown,
}

/// Session-scoped identity resolution layer.
///
/// Owned by one crawl session and torn down with it; never process-global,
/// so concurrent sessions (and tests) cannot observe each other's entries.
pub struct IdentityResolver {
    client: Arc<RemoteClient>,
    kinds: Mutex<BoundedCache<String, PrincipalKind>>,
    groups_by_email: Mutex<BoundedCache<String, BTreeSet<String>>>,
    user_names: Mutex<BoundedCache<String, Option<String>>>,
    group_names: Mutex<BoundedCache<String, Option<String>>>,
}

impl IdentityResolver {
    /// Creates a resolver whose four caches each hold `cache_size` entries.
    pub fn new(client: Arc<RemoteClient>, cache_size: usize) -> Self {
        Self {
            client,
            kinds: Mutex::new(BoundedCache::new(cache_size)),
            groups_by_email: Mutex::new(BoundedCache::new(cache_size)),
            user_names: Mutex::new(BoundedCache::new(cache_size)),
            group_names: Mutex::new(BoundedCache::new(cache_size)),
        }
    }

    /// Classifies a principal id as user, group, or unknown.
    ///
    /// The loader fetches the id as a user: found means user, absent means
    /// group. Any other failure yields `Unknown`, which is cached for the
    /// session rather than re-probed on every entry.
    pub async fn principal_kind(&self, id: &str) -> PrincipalKind {
        if let Some(kind) = self.kinds.lock().unwrap().get(&id.to_string()) {
            return *kind;
        }

        let kind = match self.client.get_user(id).await {
            Ok(Some(_)) => PrincipalKind::User,
            Ok(None) => PrincipalKind::Group,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "principal classification failed");
                PrincipalKind::Unknown
            }
        };

        self.kinds.lock().unwrap().insert(id.to_string(), kind);
        kind
    }

    /// Resolves the ids of every group whose mail matches `email`.
    ///
    /// The loader enumerates the whole group collection page by page; the
    /// cache exists precisely so one email lookup does not repeat that
    /// walk.
    pub async fn group_ids_by_email(&self, email: &str) -> Result<BTreeSet<String>> {
        if let Some(ids) = self.groups_by_email.lock().unwrap().get(&email.to_string()) {
            return Ok(ids.clone());
        }

        let client = self.client.clone();
        let mut walker = PageWalker::new(move |cursor| {
            let client = client.clone();
            async move { client.fetch_page(RemoteClient::groups_path(), &cursor).await }
        });

        let mut ids = BTreeSet::new();
        while let Some(item) = walker.next().await? {
            if let Ok(group) = serde_json::from_value::<GroupRecord>(item) {
                if group.mail_matches(email) {
                    ids.insert(group.id);
                }
            }
        }

        tracing::debug!(email = %email, matches = ids.len(), "group enumeration complete");
        self.groups_by_email
            .lock()
            .unwrap()
            .insert(email.to_string(), ids.clone());
        Ok(ids)
    }

    /// Resolves a user id to its canonical name (principal name, else
    /// mail). `Ok(None)` when the user does not exist.
    ///
    /// Ids that already look resolved (contain an `@`) short-circuit
    /// without consulting the cache or the remote system.
    pub async fn canonical_user_name(&self, id: &str) -> Result<Option<String>> {
        if id.contains('@') {
            return Ok(Some(id.to_string()));
        }

        if let Some(name) = self.user_names.lock().unwrap().get(&id.to_string()) {
            return Ok(name.clone());
        }

        let name = self
            .client
            .get_user(id)
            .await?
            .and_then(|user| user.canonical_name());

        self.user_names
            .lock()
            .unwrap()
            .insert(id.to_string(), name.clone());
        Ok(name)
    }

    /// Resolves a group id to its canonical name (mail, else alias, else
    /// display name). `Ok(None)` when the group does not exist.
    pub async fn canonical_group_name(&self, id: &str) -> Result<Option<String>> {
        if id.contains('@') {
            return Ok(Some(id.to_string()));
        }

        if let Some(name) = self.group_names.lock().unwrap().get(&id.to_string()) {
            return Ok(name.clone());
        }

        let name = self
            .client
            .get_group(id)
            .await?
            .and_then(|group| group.canonical_name());

        self.group_names
            .lock()
            .unwrap()
            .insert(id.to_string(), name.clone());
        Ok(name)
    }

    /// Clears all four caches together. The only invalidation mechanism;
    /// the session calls this at close.
    pub fn clear(&self) {
        self.kinds.lock().unwrap().clear();
        self.groups_by_email.lock().unwrap().clear();
        self.user_names.lock().unwrap().clear();
        self.group_names.lock().unwrap().clear();
    }
}
