//! Level-by-level descendant retrieval.
//!
//! Starting from the roots on the current page, each round asks the data
//! source for every record whose parent is in the current frontier, then
//! makes that batch the next frontier. Paging never applies to these
//! queries, so a visible root always brings its whole subtree along.
//!
//! Records are assumed to form a forest (unique keys, no cycles). Without
//! `max_depth` a cyclic parent chain keeps this loop running.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{GridOptions, KeyValue, Record, field};
use crate::source::{DataSource, GridQuery, Predicate};

/// Records found below a set of roots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descendants {
    /// Descendants in fetch order: level by level, source order within a level.
    pub records: Vec<Record>,

    /// Levels that returned at least one record.
    pub levels: u32,

    /// Queries issued, including the final empty one.
    pub round_trips: u32,
}

impl Descendants {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetches every descendant of a set of records.
pub struct DescendantFetcher<'a> {
    source: &'a dyn DataSource,
    template: &'a GridQuery,
    key_column: &'a str,
    parent_column: &'a str,
    max_depth: Option<u32>,
}

impl<'a> DescendantFetcher<'a> {
    /// Create a fetcher issuing queries derived from `template`.
    pub fn new(
        source: &'a dyn DataSource,
        template: &'a GridQuery,
        options: &'a GridOptions,
    ) -> Self {
        Self {
            source,
            template,
            key_column: &options.key_column,
            parent_column: options.parent_query_column(),
            max_depth: options.max_depth,
        }
    }

    /// Fetch all descendants of `roots`.
    ///
    /// One round trip per tree level plus a final empty one. No round trip is
    /// made when `roots` carry no keys.
    pub async fn fetch(&self, roots: &[Record]) -> Result<Descendants> {
        let mut found = Descendants::default();
        let mut frontier = frontier_keys(roots, self.key_column);

        while !frontier.is_empty() {
            if let Some(max) = self.max_depth
                && found.levels >= max
            {
                warn!(
                    max_depth = max,
                    pending = frontier.len(),
                    "descendant depth limit reached, deeper records skipped"
                );
                break;
            }

            let query = child_query(self.template, self.parent_column, frontier);
            let batch = self.source.fetch_all(&query).await?;
            found.round_trips += 1;

            debug!(
                level = found.levels + 1,
                fetched = batch.len(),
                "descendant round trip"
            );

            if batch.is_empty() {
                break;
            }

            found.levels += 1;
            frontier = frontier_keys(&batch, self.key_column);
            found.records.extend(batch);
        }

        Ok(found)
    }
}

/// Distinct, non-null keys of `records` in first-seen order.
pub fn frontier_keys(records: &[Record], key_column: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|record| field(record, key_column))
        .filter(|key| KeyValue::of(key).is_some_and(|k| seen.insert(k)))
        .cloned()
        .collect()
}

/// Query for the direct children of `frontier`.
pub fn child_query(template: &GridQuery, parent_column: &str, frontier: Vec<Value>) -> GridQuery {
    template.clone().and_where(Predicate::And(vec![
        Predicate::is_not_null(parent_column),
        Predicate::is_in(parent_column, frontier),
    ]))
}
