//! Depth-first tree normalization.
//!
//! Orders a flat record set so every record is immediately followed by its
//! whole subtree. Siblings keep their relative input order, roots keep the
//! order the page query returned them in. Records whose parent chain does not
//! reach the target are dropped.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use super::types::{GridOptions, KeyValue, Record, field};

/// Depth-first normalizer over a combined record set.
///
/// Uses a parent → children index, so a normalization is linear in the
/// number of records.
pub struct TreeNormalizer<'a> {
    key_column: &'a str,
    parent_column: &'a str,
    max_depth: Option<u32>,
}

impl<'a> TreeNormalizer<'a> {
    pub fn new(options: &'a GridOptions) -> Self {
        Self {
            key_column: &options.key_column,
            parent_column: &options.parent_column,
            max_depth: options.max_depth,
        }
    }

    /// Positions of `records` in depth-first order below `target`.
    ///
    /// A record with a `null` key has no children. A key shared by several
    /// records attaches its children under each of them.
    pub fn order(&self, records: &[Record], target: &Value) -> Vec<usize> {
        let mut children: HashMap<Option<KeyValue>, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            children
                .entry(KeyValue::of(field(record, self.parent_column)))
                .or_default()
                .push(index);
        }

        let mut order = Vec::with_capacity(records.len());
        let mut stack: Vec<(usize, u32)> = Vec::new();
        let mut truncated = false;

        if let Some(top) = children.get(&KeyValue::of(target)) {
            stack.extend(top.iter().rev().map(|&index| (index, 0)));
        }

        while let Some((index, depth)) = stack.pop() {
            order.push(index);

            let Some(key) = KeyValue::of(field(&records[index], self.key_column)) else {
                continue;
            };
            let Some(below) = children.get(&Some(key)) else {
                continue;
            };
            if self.max_depth.is_some_and(|max| depth >= max) {
                truncated = true;
                continue;
            }
            stack.extend(below.iter().rev().map(|&child| (child, depth + 1)));
        }

        if truncated {
            warn!(
                max_depth = self.max_depth,
                "tree depth limit reached, deeper records not rendered"
            );
        }

        order
    }

    /// Records in depth-first order below `target`.
    pub fn normalize(&self, records: &[Record], target: &Value) -> Vec<Record> {
        self.order(records, target)
            .into_iter()
            .map(|index| records[index].clone())
            .collect()
    }
}
