//! Data sources for tree grids.
//!
//! This module provides:
//! - DataSource: trait the grid fetches pages and descendant batches through
//! - GridQuery / Predicate: composable query description
//! - MemoryDataSource: in-memory rows (tests, fixtures, small static trees)
//! - PgDataSource: PostgreSQL via sqlx and SeaQuery

mod memory;
mod postgres;
mod predicate;
mod query;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::grid::PageState;
use crate::grid::types::Record;

pub use memory::MemoryDataSource;
pub use postgres::PgDataSource;
pub use predicate::Predicate;
pub use query::{GridQuery, QuerySort, SortDirection};

/// One page of records plus the total they were paged from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Records on this page, in source order.
    pub records: Vec<Record>,

    /// Resolved pagination state (clamped page, total, page count).
    pub state: PageState,
}

/// Record source backing a tree grid.
///
/// Each method call is one round trip. Failures are returned as-is and abort
/// the render that issued them.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Whether this source pages queries.
    fn pagination_enabled(&self) -> bool;

    /// Fetch one page (`page` is zero-based) together with the total count.
    async fn fetch_page(&self, query: &GridQuery, page: u32, per_page: u32) -> Result<Page>;

    /// Fetch every record matching the query.
    async fn fetch_all(&self, query: &GridQuery) -> Result<Vec<Record>>;
}
