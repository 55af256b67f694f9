//! Grid query definition and SQL generation.
//!
//! A `GridQuery` is a cloneable description of the primary fetch: base table,
//! selected columns, ANDed predicates and ordering. Cloning and constraining
//! it is how the root filter and the descendant fetch derive their queries.

use sea_query::{Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SelectStatement};
use serde::{Deserialize, Serialize};

use super::predicate::{Predicate, column_expr};

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuerySort {
    /// Column to sort by.
    pub column: String,

    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl QuerySort {
    /// Parse `name` (ascending) or `-name` (descending).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (column, direction) = match text.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (text, SortDirection::Asc),
        };
        if column.is_empty() {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// Query over a single table of self-referencing records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridQuery {
    /// Base table.
    pub table: String,

    /// Table alias; qualified column references (`n.parent_id`) name it.
    #[serde(default)]
    pub alias: Option<String>,

    /// Columns to select; empty selects every column.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Conditions, combined with AND.
    #[serde(default)]
    pub filters: Vec<Predicate>,

    /// Ordering.
    #[serde(default)]
    pub order_by: Vec<QuerySort>,
}

impl GridQuery {
    /// Query selecting every column of `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Return a copy selecting from the table under `alias`.
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.alias = (!alias.is_empty()).then_some(alias);
        self
    }

    /// Name qualifying the selected columns: the alias, else the table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// Return a copy constrained by an additional predicate.
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Return a copy with an additional sort.
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(QuerySort {
            column: column.into(),
            direction,
        });
        self
    }

    /// Return a copy selecting only the given columns.
    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// All filters as one predicate.
    pub fn condition(&self) -> Predicate {
        Predicate::And(self.filters.clone())
    }

    /// Build the SELECT for one page (`page` is zero-based).
    pub fn build_page(&self, page: u32, per_page: u32) -> String {
        let mut query = self.base_select();
        self.add_sorts(&mut query);
        query.limit(u64::from(per_page));
        query.offset(u64::from(page) * u64::from(per_page));
        query.to_string(PostgresQueryBuilder)
    }

    /// Build the SELECT for every matching row.
    pub fn build_all(&self) -> String {
        let mut query = self.base_select();
        self.add_sorts(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over every matching row.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();
        query.expr(Expr::col(Asterisk).count());
        self.add_from(&mut query);
        self.add_filters(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    fn base_select(&self) -> SelectStatement {
        let mut query = Query::select();
        if self.columns.is_empty() {
            query.column((Alias::new(self.qualifier()), Asterisk));
        } else {
            for column in &self.columns {
                query.expr(column_expr(column));
            }
        }
        self.add_from(&mut query);
        self.add_filters(&mut query);
        query
    }

    fn add_from(&self, query: &mut SelectStatement) {
        match &self.alias {
            Some(alias) => query.from_as(Alias::new(&self.table), Alias::new(alias)),
            None => query.from(Alias::new(&self.table)),
        };
    }

    fn add_filters(&self, query: &mut SelectStatement) {
        for filter in &self.filters {
            query.and_where(filter.to_condition());
        }
    }

    fn add_sorts(&self, query: &mut SelectStatement) {
        for sort in &self.order_by {
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            query.order_by_expr(column_expr(&sort.column), order);
        }
    }
}
