//! In-memory data source.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::query::{GridQuery, SortDirection};
use super::{DataSource, Page};
use crate::grid::PageState;
use crate::grid::types::{Record, field};

/// Data source over a fixed set of rows.
///
/// Predicates are evaluated per row; ordering is stable, so rows that
/// compare equal keep insertion order.
pub struct MemoryDataSource {
    rows: Vec<Record>,
    pagination: bool,
    round_trips: AtomicUsize,
}

impl MemoryDataSource {
    /// Create a paging source over the given rows.
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            pagination: true,
            round_trips: AtomicUsize::new(0),
        }
    }

    /// Report pagination as disabled.
    pub fn without_pagination(mut self) -> Self {
        self.pagination = false;
        self
    }

    /// Number of queries served so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(AtomicOrdering::Relaxed)
    }

    fn select(&self, query: &GridQuery) -> Vec<Record> {
        self.round_trips.fetch_add(1, AtomicOrdering::Relaxed);

        let condition = query.condition();
        let mut rows: Vec<Record> = self
            .rows
            .iter()
            .filter(|row| condition.matches(row))
            .cloned()
            .collect();

        if !query.order_by.is_empty() {
            rows.sort_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|sort| {
                        let ordering =
                            compare_values(field(a, &sort.column), field(b, &sort.column));
                        match sort.direction {
                            SortDirection::Asc => ordering,
                            SortDirection::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        trace!(table = %query.table, matched = rows.len(), "memory query");
        rows
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    fn pagination_enabled(&self) -> bool {
        self.pagination
    }

    async fn fetch_page(&self, query: &GridQuery, page: u32, per_page: u32) -> Result<Page> {
        let rows = self.select(query);
        let state = PageState::new(page, per_page, rows.len() as u64);

        let offset = usize::try_from(state.offset()).unwrap_or(usize::MAX);
        let records = rows
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();

        Ok(Page { records, state })
    }

    async fn fetch_all(&self, query: &GridQuery) -> Result<Vec<Record>> {
        Ok(self.select(query))
    }
}

/// Order JSON scalars: nulls first, then numbers, then everything else as text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
