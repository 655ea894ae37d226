//! Permission mapper
//!
//! Converts raw access entries into normalized role strings:
//! - a user grant contributes the user id plus, when it differs, the
//!   canonical name; downstream authorization may match on either form
//! - a group grant gets the symmetric two-role treatment
//! - an organization-scoped sharing link contributes the single
//!   everyone-in-tenant sentinel
//! - any other link scope (anonymous included) contributes nothing; the
//!   source design leaves anonymous links unmapped and so do we

use crate::acl::entry::{AccessEntry, GranteeKind};
use crate::identity::{IdentityResolver, PrincipalKind};
use crate::remote::RemoteClient;
use crate::walk::Cursor;
use crate::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Sentinel role granted by organization-scoped sharing links.
pub const TENANT_EVERYONE_ROLE: &str = "tenant:everyone";

/// Maps raw access entries to role sets for one session.
pub struct PermissionMapper {
    client: Arc<RemoteClient>,
    resolver: Arc<IdentityResolver>,
    default_roles: Vec<String>,
}

impl PermissionMapper {
    pub fn new(
        client: Arc<RemoteClient>,
        resolver: Arc<IdentityResolver>,
        default_roles: Vec<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            default_roles,
        }
    }

    /// Maps one access entry to zero or more roles.
    pub async fn map_entry(&self, entry: &AccessEntry) -> Result<BTreeSet<String>> {
        let mut roles = BTreeSet::new();

        match entry.kind {
            GranteeKind::Link => {
                match entry.link_scope.as_deref() {
                    Some("organization") => {
                        roles.insert(TENANT_EVERYONE_ROLE.to_string());
                    }
                    scope => {
                        // Anonymous and other scopes stay unmapped.
                        tracing::debug!(scope = ?scope, "skipping link grant with unmapped scope");
                    }
                }
            }
            GranteeKind::User => {
                if let Some(id) = entry.grantee_id.as_deref() {
                    roles.insert(id.to_string());
                    if let Some(name) = self.resolver.canonical_user_name(id).await? {
                        roles.insert(name);
                    }
                }
            }
            GranteeKind::Group => {
                if let Some(id) = entry.grantee_id.as_deref() {
                    roles.insert(id.to_string());
                    if let Some(name) = self.resolver.canonical_group_name(id).await? {
                        roles.insert(name);
                    }
                }
            }
            GranteeKind::Unresolved => {
                if let Some(id) = entry.grantee_id.as_deref() {
                    match self.resolver.principal_kind(id).await {
                        PrincipalKind::User => {
                            roles.insert(id.to_string());
                            if let Some(name) = self.resolver.canonical_user_name(id).await? {
                                roles.insert(name);
                            }
                        }
                        PrincipalKind::Group => {
                            roles.insert(id.to_string());
                            if let Some(name) = self.resolver.canonical_group_name(id).await? {
                                roles.insert(name);
                            }
                        }
                        PrincipalKind::Unknown => {
                            // Classification failed; grant the id form only.
                            roles.insert(id.to_string());
                        }
                    }
                }
            }
        }

        Ok(roles)
    }

    /// Resolves the full role set of one resource.
    ///
    /// Walks the resource's permission pages, maps every entry, and unions
    /// the result with the configured default roles and any roles inherited
    /// from the enclosing resource.
    ///
    /// A failure on the first page surfaces to the caller: a resource whose
    /// ACL cannot be read at all (a 403, say) must be recorded as a failed
    /// item, not indexed with default roles only. Once at least one page
    /// has been read, a failure on a later page is non-fatal: the roles
    /// accumulated so far are returned and the truncation is logged.
    pub async fn resolve_roles(
        &self,
        resource_path: &str,
        inherited: &[String],
    ) -> Result<BTreeSet<String>> {
        let mut roles: BTreeSet<String> = self.default_roles.iter().cloned().collect();
        roles.extend(inherited.iter().cloned());

        let permissions_path = RemoteClient::permissions_path(resource_path);
        let mut cursor = Cursor::start();
        let mut pages_read = 0usize;

        loop {
            let page = match self.client.fetch_page(&permissions_path, &cursor).await {
                Ok(page) => page,
                Err(e) if pages_read == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        resource = %permissions_path,
                        pages_read,
                        error = %e,
                        "permission walk truncated, keeping roles accumulated so far"
                    );
                    break;
                }
            };

            pages_read += 1;
            for record in &page.items {
                for entry in AccessEntry::from_permission(record) {
                    roles.extend(self.map_entry(&entry).await?);
                }
            }

            cursor = page.next;
            if cursor.is_empty() {
                break;
            }
        }

        Ok(roles)
    }
}
