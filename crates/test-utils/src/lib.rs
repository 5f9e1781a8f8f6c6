//! Back-office test utilities.
//!
//! Helpers for integration testing: raw document fixtures, deterministic
//! object ids, and assertion utilities for list responses.

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};

/// Base creation time for fixtures (2024-01-01T00:00:00Z).
pub const BASE_CREATED_AT_MILLIS: i64 = 1_704_067_200_000;

/// Deterministic object id: `n` in the low bytes, zeros elsewhere.
///
/// Ids sort by `n`, so fixtures can rely on `_id` order.
pub fn object_id(n: u32) -> ObjectId {
    let mut bytes = [0u8; 12];
    bytes[8..].copy_from_slice(&n.to_be_bytes());
    ObjectId::from_bytes(bytes)
}

/// Create a test document with an id and lifecycle defaults.
pub fn test_document(n: u32) -> TestDocument {
    TestDocument {
        id: object_id(n),
        fields: Document::new(),
        created_at_millis: Some(BASE_CREATED_AT_MILLIS + i64::from(n) * 1_000),
        removed: Some(false),
    }
}

/// A raw document builder for seeding stores.
#[derive(Debug, Clone)]
pub struct TestDocument {
    pub id: ObjectId,
    pub fields: Document,
    pub created_at_millis: Option<i64>,
    pub removed: Option<bool>,
}

impl TestDocument {
    /// Add a single field.
    pub fn with(mut self, name: &str, value: impl Into<Bson>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// Add a localized `names` map.
    pub fn with_names(self, names: &[(&str, &str)]) -> Self {
        let mut map = Document::new();
        for (language, text) in names {
            map.insert(*language, *text);
        }
        self.with("names", map)
    }

    /// Set the creation time.
    pub fn created_at(mut self, millis: i64) -> Self {
        self.created_at_millis = Some(millis);
        self
    }

    /// Mark as soft-deleted.
    pub fn removed(mut self) -> Self {
        self.removed = Some(true);
        self
    }

    /// Omit the `removed` flag entirely.
    pub fn without_lifecycle(mut self) -> Self {
        self.removed = None;
        self
    }

    /// Build the raw document.
    pub fn build(self) -> Document {
        let mut document = doc! { "_id": self.id };
        if let Some(millis) = self.created_at_millis {
            document.insert("createdAt", bson::DateTime::from_millis(millis));
        }
        if let Some(removed) = self.removed {
            document.insert("removed", removed);
        }
        for (name, value) in self.fields {
            document.insert(name, value);
        }
        document
    }
}

/// Fixture builders for the built-in resources.
pub mod fixtures {
    use super::{TestDocument, test_document};

    /// A user role with an English name.
    pub fn user_role(n: u32, name: &str, priority: i64) -> TestDocument {
        test_document(n)
            .with_names(&[("en", name)])
            .with("priority", priority)
            .with("active", true)
    }

    /// A user with a password hash.
    pub fn user(n: u32, email: &str) -> TestDocument {
        test_document(n)
            .with("email", email)
            .with("firstName", "Test")
            .with("lastName", format!("User {n}"))
            .with("password", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
            .with("roles", bson::Bson::Array(vec![]))
            .with("sites", bson::Bson::Array(vec![]))
            .with("active", true)
    }

    /// A site with localized names.
    pub fn site(n: u32, names: &[(&str, &str)]) -> TestDocument {
        test_document(n).with_names(names).with("active", true)
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to NOT have key '{key}', got: {value}"
        );
    }

    /// Assert the `id` of every entry in `items`, in order.
    pub fn ids_eq(items: &Value, expected: &[String]) {
        let actual: Vec<&str> = items
            .as_array()
            .map(|items| items.iter().filter_map(|item| item["id"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(actual, expected, "item ids mismatch in: {items}");
    }
}
