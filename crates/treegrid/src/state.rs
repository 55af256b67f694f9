//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use treegrid::grid::{GridOptions, TreeGrid};
use treegrid::source::{GridQuery, PgDataSource};
use treegrid::view::HtmlTableRenderer;

use crate::config::Config;
use crate::db;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// The configured tree grid.
    grid: TreeGrid,

    /// HTML renderer for the grid page.
    renderer: HtmlTableRenderer,
}

impl AppState {
    /// Connect to the database and build the grid from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let options = config.grid_options()?;
        let pool = db::connect(config).await?;

        let query = config.grid_query();

        let columns = config.display_columns(&options);
        let renderer = HtmlTableRenderer::new(columns).context("failed to load grid templates")?;

        let grid = build_grid(options, query, PgDataSource::new(pool.clone()))?;
        info!(table = %config.table, "tree grid configured");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db: pool,
                grid,
                renderer,
            }),
        })
    }

    pub fn grid(&self) -> &TreeGrid {
        &self.inner.grid
    }

    pub fn renderer(&self) -> &HtmlTableRenderer {
        &self.inner.renderer
    }

    /// Whether PostgreSQL is reachable.
    pub async fn postgres_healthy(&self) -> bool {
        db::is_reachable(&self.inner.db).await
    }
}

fn build_grid(options: GridOptions, query: GridQuery, source: PgDataSource) -> Result<TreeGrid> {
    TreeGrid::builder(options)
        .data_source(Arc::new(source), query)
        .build()
        .context("invalid tree grid configuration")
}
