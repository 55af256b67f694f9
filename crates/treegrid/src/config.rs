//! Configuration loaded from environment variables.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use treegrid::grid::GridOptions;
use treegrid::source::{GridQuery, QuerySort};
use treegrid::view::Column;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Table holding the tree records (default: "node").
    pub table: String,

    /// Alias for the table in generated SQL. Set it when the grid options
    /// reference the parent column as `<alias>.parent_id`.
    pub table_alias: Option<String>,

    /// Path to a TOML file with grid options. When unset the grid uses
    /// `id` / `parent_id` and defaults for everything else.
    pub grid_options_path: Option<PathBuf>,

    /// Displayed columns as `attribute` or `attribute:Label`, comma-separated.
    /// Defaults to the key and parent columns.
    pub columns: Vec<Column>,

    /// Ordering as comma-separated `column` / `-column` entries.
    pub order_by: Vec<QuerySort>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let table = env::var("TREEGRID_TABLE").unwrap_or_else(|_| "node".to_string());

        let table_alias = env::var("TREEGRID_TABLE_ALIAS").ok();

        let grid_options_path = env::var("TREEGRID_OPTIONS").ok().map(PathBuf::from);

        let columns = env::var("TREEGRID_COLUMNS")
            .map(|s| parse_columns(&s))
            .unwrap_or_default();

        let order_by = env::var("TREEGRID_ORDER_BY")
            .map(|s| parse_order_by(&s))
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            table,
            table_alias,
            grid_options_path,
            columns,
            order_by,
        })
    }

    /// Primary grid query: the configured table, alias and ordering.
    pub fn grid_query(&self) -> GridQuery {
        let mut query = GridQuery::new(self.table.clone());
        if let Some(alias) = &self.table_alias {
            query = query.aliased(alias.clone());
        }
        query.order_by = self.order_by.clone();
        query
    }

    /// Load grid options from the configured TOML file, or defaults.
    pub fn grid_options(&self) -> Result<GridOptions> {
        match &self.grid_options_path {
            Some(path) => load_grid_options(path),
            None => Ok(GridOptions::new("id", "parent_id")),
        }
    }

    /// Displayed columns, falling back to the key and parent columns.
    pub fn display_columns(&self, options: &GridOptions) -> Vec<Column> {
        if self.columns.is_empty() {
            vec![
                Column::new(options.key_column.clone()),
                Column::new(options.parent_column.clone()),
            ]
        } else {
            self.columns.clone()
        }
    }
}

/// Read grid options from a TOML file.
pub fn load_grid_options(path: &Path) -> Result<GridOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grid options from {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse grid options in {}", path.display()))
}

fn parse_columns(value: &str) -> Vec<Column> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((attribute, label)) => Column::labeled(attribute.trim(), label.trim()),
            None => Column::new(entry),
        })
        .collect()
}

fn parse_order_by(value: &str) -> Vec<QuerySort> {
    value.split(',').filter_map(QuerySort::parse).collect()
}
