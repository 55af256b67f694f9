//! Tree grid orchestration.
//!
//! Ties the pipeline together for one render: pagination gate, root-only
//! page fetch, descendant expansion, depth-first normalization, summary
//! correction and row tagging. Nothing is kept between renders.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::descendants::DescendantFetcher;
use super::error::{GridError, GridResult};
use super::normalize::TreeNormalizer;
use super::pagination::{PageRequest, PageSize, PageState, pagination_active, root_filter};
use super::rows::{TaggedRow, tag_rows};
use super::summary::{Summary, SummaryFields, SummaryFormatter, TeraSummaryFormatter, summarize};
use super::types::{GridOptions, InitialState, Record};
use crate::source::{DataSource, GridQuery};

/// State of the "Expand All / Collapse All" control.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CollapseToggle {
    /// Whether "Collapse All" is the active side.
    pub collapsed: bool,
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct GridOutput {
    /// Rows in depth-first order.
    pub rows: Vec<TaggedRow>,

    /// Corrected counts and summary text.
    pub summary: Summary,

    /// Pagination state when pagination applied.
    pub pagination: Option<PageState>,

    /// Records fetched outside paging.
    pub descendant_count: usize,

    /// Records dropped because their parent chain never reached a root.
    pub orphan_count: usize,

    /// Present when the grid is collapsable.
    pub collapse_toggle: Option<CollapseToggle>,

    /// Options for the client-side tree plugin.
    pub client_options: serde_json::Value,

    /// Text for the placeholder row.
    pub empty_text: String,
}

impl GridOutput {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }
}

/// A configured tree grid.
///
/// Built through [`TreeGrid::builder`]; configuration problems surface from
/// [`TreeGridBuilder::build`] before anything is fetched.
pub struct TreeGrid {
    options: GridOptions,
    query: GridQuery,
    source: Arc<dyn DataSource>,
    formatter: Arc<dyn SummaryFormatter>,
}

impl std::fmt::Debug for TreeGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeGrid")
            .field("options", &self.options)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl TreeGrid {
    pub fn builder(options: GridOptions) -> TreeGridBuilder {
        TreeGridBuilder {
            options,
            data: None,
            formatter: None,
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn query(&self) -> &GridQuery {
        &self.query
    }

    /// Fetch and order the records for one page.
    pub async fn render(&self, request: &PageRequest) -> GridResult<GridOutput> {
        let source = self.source.as_ref();
        let normalizer = TreeNormalizer::new(&self.options);
        let root = &self.options.root_value;

        let (normalized, fields, pagination, descendant_count, combined_len) =
            match request.page_size {
                PageSize::Limit(per_page) if pagination_active(request, source) => {
                    let (roots_query, template) = root_filter(&self.query, &self.options);
                    let page = source
                        .fetch_page(&roots_query, request.page, per_page)
                        .await?;
                    let descendants = DescendantFetcher::new(source, &template, &self.options)
                        .fetch(&page.records)
                        .await?;

                    let descendant_count = descendants.len();
                    let mut combined: Vec<Record> = page.records;
                    combined.extend(descendants.records);

                    let normalized = normalizer.normalize(&combined, root);
                    let fields = SummaryFields::paginated(
                        &page.state,
                        normalized.len() as u64,
                        descendant_count as u64,
                    );
                    (
                        normalized,
                        fields,
                        Some(page.state),
                        descendant_count,
                        combined.len(),
                    )
                }
                _ => {
                    let combined = source.fetch_all(&self.query).await?;
                    let normalized = normalizer.normalize(&combined, root);
                    let fields = SummaryFields::unpaginated(combined.len() as u64);
                    (normalized, fields, None, 0, combined.len())
                }
            };

        let orphan_count = combined_len.saturating_sub(normalized.len());
        debug!(
            paginated = pagination.is_some(),
            rows = normalized.len(),
            descendants = descendant_count,
            orphans = orphan_count,
            "tree grid rendered"
        );

        let summary = summarize(
            self.formatter.as_ref(),
            self.options.summary.as_deref(),
            fields,
            pagination.is_some(),
        )?;

        Ok(GridOutput {
            rows: tag_rows(normalized, &self.options),
            summary,
            pagination,
            descendant_count,
            orphan_count,
            collapse_toggle: self.options.collapsable.then(|| CollapseToggle {
                collapsed: self.options.initial_state() == InitialState::Collapsed,
            }),
            client_options: serde_json::Value::Object(self.options.client_options.clone()),
            empty_text: self.options.empty_text().to_string(),
        })
    }
}

/// Builder validating tree grid configuration.
pub struct TreeGridBuilder {
    options: GridOptions,
    data: Option<(Arc<dyn DataSource>, GridQuery)>,
    formatter: Option<Arc<dyn SummaryFormatter>>,
}

impl TreeGridBuilder {
    /// Set the data source and the primary query it runs.
    pub fn data_source(mut self, source: Arc<dyn DataSource>, query: GridQuery) -> Self {
        self.data = Some((source, query));
        self
    }

    /// Replace the default Tera summary formatter.
    pub fn formatter(mut self, formatter: Arc<dyn SummaryFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Validate the configuration.
    pub fn build(self) -> GridResult<TreeGrid> {
        let (source, query) = self.data.ok_or(GridError::MissingDataSource)?;

        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(TeraSummaryFormatter::new()));
        if let Some(template) = self.options.summary.as_deref()
            && !template.is_empty()
        {
            formatter.validate(template)?;
        }

        if self.options.key_column.trim().is_empty() {
            return Err(GridError::MissingKeyColumn);
        }
        if self.options.parent_column.trim().is_empty() {
            return Err(GridError::MissingParentColumn);
        }

        Ok(TreeGrid {
            options: self.options,
            query,
            source,
            formatter,
        })
    }
}
