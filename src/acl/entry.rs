//! Raw access-control entries
//!
//! One wire permission record can grant to several identities at once; it
//! flattens into zero or more [`AccessEntry`] values, one per grantee.

use serde_json::Value;

/// What kind of grantee an entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranteeKind {
    User,
    Group,
    /// A sharing link rather than a principal.
    Link,
    /// The wire record named a principal without saying which kind;
    /// resolved through the principal-kind cache at mapping time.
    Unresolved,
}

/// One raw grant record, as received from the permissions endpoint.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    /// Principal id; absent for link grants.
    pub grantee_id: Option<String>,

    pub kind: GranteeKind,

    /// Scope of a sharing link (`organization`, `anonymous`, ...).
    pub link_scope: Option<String>,
}

impl AccessEntry {
    fn principal(id: String, kind: GranteeKind) -> Self {
        Self {
            grantee_id: Some(id),
            kind,
            link_scope: None,
        }
    }

    /// Flattens one wire permission record into its grant entries.
    ///
    /// Recognized shapes:
    /// - `link.scope`: a sharing-link grant;
    /// - `grantedToV2` / each element of `grantedToIdentitiesV2`: an
    ///   identity set holding a `user`, a `group`, or an untyped
    ///   `identity`, each with an `id`.
    ///
    /// Unrecognized records flatten to nothing rather than failing the
    /// resource; the remote system grows grant shapes faster than crawlers
    /// follow.
    pub fn from_permission(value: &Value) -> Vec<AccessEntry> {
        let mut entries = Vec::new();

        if let Some(scope) = value
            .get("link")
            .and_then(|l| l.get("scope"))
            .and_then(Value::as_str)
        {
            entries.push(AccessEntry {
                grantee_id: None,
                kind: GranteeKind::Link,
                link_scope: Some(scope.to_string()),
            });
        }

        if let Some(set) = value.get("grantedToV2") {
            entries.extend(Self::from_identity_set(set));
        }
        if let Some(sets) = value.get("grantedToIdentitiesV2").and_then(Value::as_array) {
            for set in sets {
                entries.extend(Self::from_identity_set(set));
            }
        }

        entries
    }

    fn from_identity_set(set: &Value) -> Option<AccessEntry> {
        let id_of = |key: &str| {
            set.get(key)
                .and_then(|i| i.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        if let Some(id) = id_of("user") {
            return Some(Self::principal(id, GranteeKind::User));
        }
        if let Some(id) = id_of("group") {
            return Some(Self::principal(id, GranteeKind::Group));
        }
        if let Some(id) = id_of("identity") {
            return Some(Self::principal(id, GranteeKind::Unresolved));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_grant() {
        let entries = AccessEntry::from_permission(&json!({
            "id": "perm1",
            "grantedToV2": {"user": {"id": "u1", "displayName": "Jane"}}
        }));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, GranteeKind::User);
        assert_eq!(entries[0].grantee_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_multiple_identities() {
        let entries = AccessEntry::from_permission(&json!({
            "grantedToIdentitiesV2": [
                {"user": {"id": "u1"}},
                {"group": {"id": "g1"}},
                {"identity": {"id": "p9"}}
            ]
        }));

        let kinds: Vec<_> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                GranteeKind::User,
                GranteeKind::Group,
                GranteeKind::Unresolved
            ]
        );
    }

    #[test]
    fn test_link_grant() {
        let entries = AccessEntry::from_permission(&json!({
            "link": {"scope": "organization", "type": "view"}
        }));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, GranteeKind::Link);
        assert_eq!(entries[0].link_scope.as_deref(), Some("organization"));
        assert!(entries[0].grantee_id.is_none());
    }

    #[test]
    fn test_unrecognized_record_flattens_to_nothing() {
        let entries = AccessEntry::from_permission(&json!({
            "id": "perm1",
            "somethingNew": {}
        }));
        assert!(entries.is_empty());
    }
}
