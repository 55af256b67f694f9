//! Row tagging.
//!
//! Each normalized record is handed to the renderer with structural hints:
//! a node token derived from its key, a parent token when it hangs below
//! another record, and whether it starts out hidden.

use serde::Serialize;
use serde_json::Value;

use super::types::{GridOptions, InitialState, KeyValue, Record, field, key_text, keys_equal};

/// A normalized record with its rendering hints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaggedRow {
    /// The record, unchanged.
    pub record: Record,

    /// Rendering key (the record's key value).
    pub key: Value,

    /// Zero-based position in the normalized sequence.
    pub index: usize,

    /// `<prefix>-<key>`.
    pub node_token: String,

    /// `<prefix>-parent-<parent key>` for non-root records.
    pub parent_token: Option<String>,

    /// Hidden until expanded on the client.
    pub hidden: bool,
}

impl TaggedRow {
    /// Value for the `data-key` attribute.
    ///
    /// Scalar keys render as text, composite keys as JSON.
    pub fn data_key(&self) -> String {
        match &self.key {
            Value::Array(_) | Value::Object(_) => self.key.to_string(),
            other => key_text(other),
        }
    }

    /// CSS tokens in attribute order.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens = vec![self.node_token.as_str()];
        if let Some(parent) = &self.parent_token {
            tokens.push(parent);
        }
        tokens
    }
}

/// Attach rendering hints to a normalized sequence.
pub fn tag_rows(records: Vec<Record>, options: &GridOptions) -> Vec<TaggedRow> {
    let collapsed = options.initial_state() == InitialState::Collapsed;
    let prefix = &options.token_prefix;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let key = field(&record, &options.key_column).clone();
            let parent = field(&record, &options.parent_column);

            let parent_token = KeyValue::of(parent)
                .filter(|_| !keys_equal(parent, &options.root_value))
                .map(|parent_key| format!("{prefix}-parent-{parent_key}"));

            TaggedRow {
                node_token: format!("{prefix}-{}", key_text(&key)),
                hidden: collapsed && parent_token.is_some(),
                parent_token,
                key,
                index,
                record,
            }
        })
        .collect()
}
