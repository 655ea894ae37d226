//! Normalized output documents

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// A normalized document handed to the document sink.
///
/// `roles` is a set: duplicates removed, order not significant. Field
/// mapping beyond the engine's own keys is the calling crawler's business;
/// the engine just carries the map through.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Canonical URL of the source resource.
    pub url: String,

    /// Mapped document fields.
    pub fields: serde_json::Map<String, serde_json::Value>,

    /// Resolved authorization roles.
    pub roles: BTreeSet<String>,

    /// When the engine finished processing this resource.
    pub crawled_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document with no fields and no roles.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: serde_json::Map::new(),
            roles: BTreeSet::new(),
            crawled_at: Utc::now(),
        }
    }

    /// Sets one mapped field.
    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Replaces the role set.
    pub fn with_roles(mut self, roles: BTreeSet<String>) -> Self {
        self.roles = roles;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::new("https://contoso.example/sites/s1")
            .with_field("title", serde_json::json!("Engineering"))
            .with_roles(BTreeSet::from(["u1".to_string(), "u1".to_string()]));

        assert_eq!(doc.url, "https://contoso.example/sites/s1");
        assert_eq!(doc.fields["title"], "Engineering");
        // Sets dedup by construction.
        assert_eq!(doc.roles.len(), 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let doc = Document::new("https://contoso.example/sites/s1");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["url"], "https://contoso.example/sites/s1");
        assert!(json["roles"].as_array().unwrap().is_empty());
    }
}
