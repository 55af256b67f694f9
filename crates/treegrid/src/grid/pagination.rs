//! Pagination gate and root filter.
//!
//! Pagination only ever counts root records. When it applies, the primary
//! query is cloned: one copy is restricted to roots and paged, the other is
//! kept unconstrained as the template for descendant fetches.

use serde::{Deserialize, Serialize};

use super::types::GridOptions;
use crate::source::{DataSource, GridQuery, Predicate};

/// Requested page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    /// Everything on one page.
    All,
    /// At most this many roots per page.
    Limit(u32),
}

impl PageSize {
    /// Interpret the `per-page` request parameter.
    ///
    /// Absent uses the configured default. The configured "all" value and
    /// zero mean [`PageSize::All`]; any other negative value falls back to
    /// the default.
    pub fn from_param(value: Option<i64>, options: &GridOptions) -> Self {
        let Some(value) = value else {
            return Self::limit(options.default_page_size);
        };
        if value == options.all_page_size || value == 0 {
            return Self::All;
        }
        if value < 0 {
            return Self::limit(options.default_page_size);
        }
        Self::limit(u32::try_from(value).unwrap_or(u32::MAX))
    }

    fn limit(size: u32) -> Self {
        if size == 0 { Self::All } else { Self::Limit(size) }
    }
}

/// Page request from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,

    /// Requested page size.
    pub page_size: PageSize,
}

impl PageRequest {
    /// Build from request parameters; `page` is one-based on the wire.
    pub fn from_params(page: Option<u32>, per_page: Option<i64>, options: &GridOptions) -> Self {
        Self {
            page: page.unwrap_or(1).saturating_sub(1),
            page_size: PageSize::from_param(per_page, options),
        }
    }

    /// First page with the default page size.
    pub fn first(options: &GridOptions) -> Self {
        Self::from_params(None, None, options)
    }

    /// Everything on one page.
    pub fn all() -> Self {
        Self {
            page: 0,
            page_size: PageSize::All,
        }
    }
}

/// Resolved pagination state once the root total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Zero-based page index, clamped into range.
    pub page: u32,

    /// Roots per page.
    pub page_size: u32,

    /// Total number of roots.
    pub total_count: u64,

    /// Number of pages (at least one).
    pub page_count: u32,
}

impl PageState {
    /// Clamp the requested page against the root total.
    pub fn new(requested_page: u32, page_size: u32, total_count: u64) -> Self {
        let page_count = if page_size > 0 {
            total_count.div_ceil(u64::from(page_size)).max(1)
        } else {
            1
        };
        let page_count = u32::try_from(page_count).unwrap_or(u32::MAX);

        Self {
            page: requested_page.min(page_count - 1),
            page_size,
            total_count,
            page_count,
        }
    }

    /// Row offset of the first root on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Whether there's a next page.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    /// Whether there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

/// Decide whether pagination applies to this render.
///
/// Both conditions must hold: the request did not ask for everything, and
/// the data source pages this query.
pub fn pagination_active(request: &PageRequest, source: &dyn DataSource) -> bool {
    matches!(request.page_size, PageSize::Limit(_)) && source.pagination_enabled()
}

/// Predicate selecting root records.
pub fn root_predicate(options: &GridOptions) -> Predicate {
    let column = options.parent_query_column();
    if options.root_value.is_null() {
        Predicate::is_null(column)
    } else {
        Predicate::Equals(column.to_string(), options.root_value.clone())
    }
}

/// Split the primary query into the root-only page query and the
/// unconstrained template kept for descendant fetches.
pub fn root_filter(query: &GridQuery, options: &GridOptions) -> (GridQuery, GridQuery) {
    let template = query.clone();
    let roots = query.clone().and_where(root_predicate(options));
    (roots, template)
}
