//! Wire models for directory entities
//!
//! Minimal projections of the remote payloads: only the fields the engine
//! itself consumes. Front-end crawlers that need richer field mapping work
//! from the raw JSON values instead.

use serde::Deserialize;

/// A directory user, as returned by the user endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,

    /// Sign-in name, e.g. `jane@contoso.example`.
    #[serde(default)]
    pub user_principal_name: Option<String>,

    #[serde(default)]
    pub mail: Option<String>,
}

impl UserRecord {
    /// Canonical name: principal name, else mail.
    pub fn canonical_name(&self) -> Option<String> {
        self.user_principal_name
            .clone()
            .or_else(|| self.mail.clone())
    }
}

/// A directory group, as returned by the group endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,

    #[serde(default)]
    pub mail: Option<String>,

    /// Mail alias without the domain part.
    #[serde(default)]
    pub mail_nickname: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

impl GroupRecord {
    /// Canonical name: mail, else alias, else display name.
    pub fn canonical_name(&self) -> Option<String> {
        self.mail
            .clone()
            .or_else(|| self.mail_nickname.clone())
            .or_else(|| self.display_name.clone())
    }

    /// Whether this group's mail matches `email` (case-insensitive).
    pub fn mail_matches(&self, email: &str) -> bool {
        self.mail
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case(email))
            .unwrap_or(false)
    }
}

/// A top-level site entity, the unit the session enumerates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub id: String,

    #[serde(default)]
    pub web_url: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

impl SiteRecord {
    /// Display label for logs and documents.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_canonical_name_prefers_principal_name() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "userPrincipalName": "jane@contoso.example",
            "mail": "jane.doe@contoso.example"
        }))
        .unwrap();
        assert_eq!(
            user.canonical_name().as_deref(),
            Some("jane@contoso.example")
        );
    }

    #[test]
    fn test_user_canonical_name_falls_back_to_mail() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "mail": "jane.doe@contoso.example"
        }))
        .unwrap();
        assert_eq!(
            user.canonical_name().as_deref(),
            Some("jane.doe@contoso.example")
        );
    }

    #[test]
    fn test_group_canonical_name_order() {
        let group: GroupRecord = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "mailNickname": "eng",
            "displayName": "Engineering"
        }))
        .unwrap();
        assert_eq!(group.canonical_name().as_deref(), Some("eng"));

        let group: GroupRecord = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "displayName": "Engineering"
        }))
        .unwrap();
        assert_eq!(group.canonical_name().as_deref(), Some("Engineering"));
    }

    #[test]
    fn test_group_mail_match_is_case_insensitive() {
        let group: GroupRecord = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "mail": "Eng@Contoso.example"
        }))
        .unwrap();
        assert!(group.mail_matches("eng@contoso.example"));
        assert!(!group.mail_matches("other@contoso.example"));
    }
}
