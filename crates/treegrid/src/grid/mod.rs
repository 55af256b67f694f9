//! Tree grid core.
//!
//! This module provides:
//! - TreeGrid: orchestrates one render from page request to tagged rows
//! - Pagination gate and root filter: decide paging, restrict it to roots
//! - DescendantFetcher: pulls every descendant of the visible roots
//! - TreeNormalizer: depth-first ordering of the combined set
//! - Summary: corrected counts and the formatted summary text
//! - Row tagging: node/parent tokens and initial visibility

mod descendants;
mod error;
mod normalize;
mod pagination;
mod rows;
mod summary;
mod tree_grid;
pub mod types;

pub use descendants::{DescendantFetcher, Descendants, child_query, frontier_keys};
pub use error::{GridError, GridResult};
pub use normalize::TreeNormalizer;
pub use pagination::{
    PageRequest, PageSize, PageState, pagination_active, root_filter, root_predicate,
};
pub use rows::{TaggedRow, tag_rows};
pub use summary::{
    PAGED_SUMMARY, Summary, SummaryFields, SummaryFormatter, TOTAL_SUMMARY, TeraSummaryFormatter,
    summarize,
};
pub use tree_grid::{CollapseToggle, GridOutput, TreeGrid, TreeGridBuilder};
pub use types::{GridOptions, InitialState, KeyValue, Record};

pub(crate) use error::describe;
