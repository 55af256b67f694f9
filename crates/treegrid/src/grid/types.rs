//! Tree grid types.
//!
//! Provides type definitions shared by the tree grid pipeline:
//! - Record: opaque JSON row carried through unchanged
//! - KeyValue: canonical, comparable form of key and parent values
//! - GridOptions: widget configuration (columns, root sentinel, client options)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row from the data source.
///
/// Rows are JSON objects; only the key and parent fields are interpreted.
pub type Record = Value;

static NULL: Value = Value::Null;

/// Read a field from a record.
///
/// Exact field names win; otherwise a dotted name is followed as a path
/// into nested objects. Missing fields read as `null`.
pub fn field<'a>(record: &'a Record, name: &str) -> &'a Value {
    if let Some(value) = record.get(name) {
        return value;
    }
    if name.contains('.') {
        let mut current = record;
        for part in name.split('.') {
            match current.get(part) {
                Some(value) => current = value,
                None => return &NULL,
            }
        }
        return current;
    }
    &NULL
}

/// Canonical text form of a key or parent value.
///
/// Values compare loosely: `1` and `"1"` are the same key. `null` has no
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValue(String);

impl KeyValue {
    /// Canonicalize a JSON value; `None` for `null`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            other => Some(Self(other.to_string())),
        }
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loose equality between two key values. `null` only equals `null`.
pub fn keys_equal(a: &Value, b: &Value) -> bool {
    KeyValue::of(a) == KeyValue::of(b)
}

/// Text used for CSS tokens and `data-key` attributes; empty for `null`.
pub fn key_text(value: &Value) -> String {
    KeyValue::of(value).map(|k| k.0).unwrap_or_default()
}

/// Initial collapse state handed to the client-side tree plugin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    #[default]
    Expanded,
    Collapsed,
}

/// Tree grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOptions {
    /// Record field holding the unique key.
    #[serde(default)]
    pub key_column: String,

    /// Record field holding the parent key.
    #[serde(default)]
    pub parent_column: String,

    /// Column reference used for the parent field inside query predicates,
    /// when it differs from the record field (e.g. `n.parent_id` when the
    /// query selects from an aliased table, see `GridQuery::aliased`).
    #[serde(default)]
    pub parent_column_alias: Option<String>,

    /// Parent value that marks a root record.
    #[serde(default)]
    pub root_value: Value,

    /// Options passed through to the client-side tree plugin.
    ///
    /// Only `initialState` is read here.
    #[serde(default)]
    pub client_options: serde_json::Map<String, Value>,

    /// Whether to show the "Expand All / Collapse All" toggle.
    #[serde(default)]
    pub collapsable: bool,

    /// Custom summary template. `Some("")` hides the summary.
    ///
    /// Written in Tera syntax over `begin`, `end`, `count`, `totalCount`,
    /// `page` and `pageCount`, with the `number` and `plural(one, other)`
    /// filters: `Showing {{ begin }}-{{ end }} of {{ totalCount | number }}`.
    /// Single-brace placeholders such as `{begin}` are rejected.
    #[serde(default)]
    pub summary: Option<String>,

    /// Text shown in the placeholder row when there is nothing to render.
    #[serde(default)]
    pub empty_text: Option<String>,

    /// Page size used when the request does not carry one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Page-size request value meaning "show everything".
    #[serde(default = "default_all_page_size")]
    pub all_page_size: i64,

    /// Prefix for row CSS tokens (`<prefix>-<key>`, `<prefix>-parent-<key>`).
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    /// Optional limit on tree depth below the roots.
    #[serde(default)]
    pub max_depth: Option<u32>,
}

fn default_page_size() -> u32 {
    40
}

fn default_all_page_size() -> i64 {
    -1
}

fn default_token_prefix() -> String {
    "treegrid".to_string()
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            key_column: String::new(),
            parent_column: String::new(),
            parent_column_alias: None,
            root_value: Value::Null,
            client_options: serde_json::Map::new(),
            collapsable: false,
            summary: None,
            empty_text: None,
            default_page_size: default_page_size(),
            all_page_size: default_all_page_size(),
            token_prefix: default_token_prefix(),
            max_depth: None,
        }
    }
}

impl GridOptions {
    /// Options for the given key and parent fields, everything else default.
    pub fn new(key_column: impl Into<String>, parent_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            parent_column: parent_column.into(),
            ..Default::default()
        }
    }

    /// Column reference for the parent field in query predicates.
    pub fn parent_query_column(&self) -> &str {
        self.parent_column_alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.parent_column)
    }

    /// Initial collapse state from `client_options.initialState`.
    pub fn initial_state(&self) -> InitialState {
        match self.client_options.get("initialState").and_then(Value::as_str) {
            Some("collapsed") => InitialState::Collapsed,
            _ => InitialState::Expanded,
        }
    }

    /// Placeholder text for empty grids.
    pub fn empty_text(&self) -> &str {
        self.empty_text.as_deref().unwrap_or("No results found.")
    }

    /// Whether a record is a root under these options.
    pub fn is_root(&self, record: &Record) -> bool {
        keys_equal(field(record, &self.parent_column), &self.root_value)
    }
}
