//! PostgreSQL data source.
//!
//! Queries are generated with SeaQuery and each row is returned as JSON via
//! `row_to_json`, so records keep every selected column.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::query::GridQuery;
use super::{DataSource, Page};
use crate::grid::PageState;
use crate::grid::types::Record;

/// Statement timeout for every page and descendant query.
const STATEMENT_TIMEOUT_SQL: &str = "SET LOCAL statement_timeout = '10s'";

/// Data source backed by a PostgreSQL pool.
pub struct PgDataSource {
    pool: PgPool,
    pagination: bool,
}

impl PgDataSource {
    /// Create a paging source over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            pagination: true,
        }
    }

    /// Report pagination as disabled; every render fetches the full set.
    pub fn without_pagination(mut self) -> Self {
        self.pagination = false;
        self
    }

    /// Wrap a SELECT so each row comes back as one JSON object.
    pub fn json_rows_sql(select_sql: &str) -> String {
        format!("SELECT row_to_json(t) FROM ({select_sql}) t")
    }

    /// Begin a transaction with the statement timeout set.
    ///
    /// SET LOCAL resets on commit or rollback.
    async fn begin_timed(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query(STATEMENT_TIMEOUT_SQL)
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        Ok(tx)
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    fn pagination_enabled(&self) -> bool {
        self.pagination
    }

    async fn fetch_page(&self, query: &GridQuery, page: u32, per_page: u32) -> Result<Page> {
        let mut tx = self.begin_timed().await?;

        let count_sql = query.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute count query")?;

        let state = PageState::new(page, per_page, u64::try_from(total).unwrap_or(0));

        let page_sql = Self::json_rows_sql(&query.build_page(state.page, per_page));
        let records: Vec<Record> = sqlx::query_scalar(&page_sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute page query")?;

        tx.commit()
            .await
            .context("failed to commit page transaction")?;

        debug!(
            table = %query.table,
            page = state.page,
            total = state.total_count,
            fetched = records.len(),
            "fetched page"
        );

        Ok(Page { records, state })
    }

    async fn fetch_all(&self, query: &GridQuery) -> Result<Vec<Record>> {
        let mut tx = self.begin_timed().await?;

        let sql = Self::json_rows_sql(&query.build_all());
        let records: Vec<Record> = sqlx::query_scalar(&sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute query")?;

        tx.commit()
            .await
            .context("failed to commit query transaction")?;

        debug!(table = %query.table, fetched = records.len(), "fetched records");
        Ok(records)
    }
}
