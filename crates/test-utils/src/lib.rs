//! Treegrid test utilities.
//!
//! Helpers for integration testing: record fixtures, tree builders,
//! and assertion utilities for rendered output.

use serde_json::Value as JsonValue;

/// Create a test record with the default `id` / `parent_id` field names.
pub fn test_record(id: i64, parent_id: Option<i64>) -> TestRecord {
    TestRecord {
        key_field: "id".to_string(),
        parent_field: "parent_id".to_string(),
        id: JsonValue::from(id),
        parent_id: parent_id.map(JsonValue::from).unwrap_or(JsonValue::Null),
        fields: serde_json::Map::new(),
    }
}

/// A test record builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub key_field: String,
    pub parent_field: String,
    pub id: JsonValue,
    pub parent_id: JsonValue,
    pub fields: serde_json::Map<String, JsonValue>,
}

impl TestRecord {
    /// Use custom key and parent field names.
    pub fn with_field_names(mut self, key_field: &str, parent_field: &str) -> Self {
        self.key_field = key_field.to_string();
        self.parent_field = parent_field.to_string();
        self
    }

    /// Replace the key with an arbitrary JSON value.
    pub fn with_key(mut self, key: JsonValue) -> Self {
        self.id = key;
        self
    }

    /// Replace the parent reference with an arbitrary JSON value.
    pub fn with_parent(mut self, parent: JsonValue) -> Self {
        self.parent_id = parent;
        self
    }

    /// Set the display name.
    pub fn named(self, name: &str) -> Self {
        self.with_field("name", JsonValue::from(name))
    }

    /// Add a payload field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Build the record as a JSON object.
    pub fn build(self) -> JsonValue {
        let mut obj = self.fields;
        obj.insert(self.key_field, self.id);
        obj.insert(self.parent_field, self.parent_id);
        JsonValue::Object(obj)
    }
}

/// Build a record set from `(id, parent_id)` pairs.
pub fn records(pairs: &[(i64, Option<i64>)]) -> Vec<JsonValue> {
    pairs
        .iter()
        .map(|(id, parent)| test_record(*id, *parent).named(&format!("node {id}")).build())
        .collect()
}

/// Extract the `id` field of each record, in order.
pub fn ids(records: &[JsonValue]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|r| r.get("id").and_then(JsonValue::as_i64))
        .collect()
}

/// Fixture trees for testing.
pub mod trees {
    use serde_json::Value as JsonValue;

    use super::records;

    /// Three roots; the first has a two-level subtree, the third one child.
    ///
    /// ```text
    /// 1
    /// ├── 2
    /// │   └── 4
    /// └── 3
    /// 5
    /// 6
    /// └── 7
    /// ```
    pub fn small_forest() -> Vec<JsonValue> {
        records(&[
            (1, None),
            (2, Some(1)),
            (3, Some(1)),
            (4, Some(2)),
            (5, None),
            (6, None),
            (7, Some(6)),
        ])
    }

    /// A single chain `10 -> 11 -> 12`.
    pub fn chain() -> Vec<JsonValue> {
        records(&[(10, None), (11, Some(10)), (12, Some(11))])
    }

    /// `count` roots, each with `children` direct children.
    pub fn wide(count: i64, children: i64) -> Vec<JsonValue> {
        let mut pairs = Vec::new();
        for root in 1..=count {
            pairs.push((root * 1000, None));
            for child in 1..=children {
                pairs.push((root * 1000 + child, Some(root * 1000)));
            }
        }
        records(&pairs)
    }
}

/// Assertion helpers for rendered output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that `needle` occurs exactly `expected` times.
    pub fn occurrences(haystack: &str, needle: &str, expected: usize) {
        let actual = haystack.matches(needle).count();
        assert_eq!(
            actual, expected,
            "Expected '{needle}' {expected} time(s), found {actual}\nActual: {haystack}"
        );
    }
}
