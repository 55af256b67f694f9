//! Table rendering.
//!
//! This module provides:
//! - TableRenderer: the boundary the grid hands tagged rows across
//! - render_body / render_table: row sequencing, hooks, empty placeholder
//! - HtmlTableRenderer: Tera-backed HTML table, toggle, pager
//! - Pager: previous/next/page links

mod html;
mod pager;

use serde_json::Value;

use crate::grid::{GridOutput, GridResult, TaggedRow};

pub use html::{Column, HtmlTableRenderer, RowHook, RowOptions};
pub use pager::{Pager, PagerLink, PagerStyle};

/// Default CSS class of the rendered table.
pub const TABLE_CLASS: &str = "table tree-grid";

/// Renders tagged rows into table markup.
pub trait TableRenderer: Send + Sync {
    /// Number of columns; the empty placeholder spans all of them.
    fn column_count(&self) -> usize;

    /// Table header, `None` when headers are hidden.
    fn render_header(&self) -> GridResult<Option<String>>;

    /// One table row.
    fn render_row(&self, row: &TaggedRow) -> GridResult<String>;

    /// Table footer, `None` when footers are hidden.
    fn render_footer(&self) -> GridResult<Option<String>>;

    /// The single placeholder row shown when there is nothing to render.
    fn render_empty(&self, text: &str) -> GridResult<String>;

    /// Markup inserted before a row.
    fn before_row(&self, _row: &TaggedRow) -> Option<String> {
        None
    }

    /// Markup inserted after a row.
    fn after_row(&self, _row: &TaggedRow) -> Option<String> {
        None
    }

    /// CSS class of the `<table>` element.
    fn table_class(&self) -> &str {
        TABLE_CLASS
    }
}

/// Render the `<tbody>` for a grid output.
///
/// Rows keep their normalized order. Hook output is only inserted when it
/// is non-empty. An empty output yields exactly one placeholder row.
pub fn render_body(renderer: &dyn TableRenderer, output: &GridOutput) -> GridResult<String> {
    let mut parts = Vec::with_capacity(output.rows.len().max(1));

    for row in &output.rows {
        if let Some(before) = renderer.before_row(row).filter(|s| !s.is_empty()) {
            parts.push(before);
        }
        parts.push(renderer.render_row(row)?);
        if let Some(after) = renderer.after_row(row).filter(|s| !s.is_empty()) {
            parts.push(after);
        }
    }

    if parts.is_empty() {
        parts.push(renderer.render_empty(&output.empty_text)?);
    }

    Ok(format!("<tbody>\n{}\n</tbody>", parts.join("\n")))
}

/// Render the complete `<table>` element.
pub fn render_table(renderer: &dyn TableRenderer, output: &GridOutput) -> GridResult<String> {
    let mut sections = Vec::with_capacity(3);
    if let Some(header) = renderer.render_header()? {
        sections.push(header);
    }
    sections.push(render_body(renderer, output)?);
    if let Some(footer) = renderer.render_footer()? {
        sections.push(footer);
    }

    Ok(format!(
        "<table class=\"{}\">\n{}\n</table>",
        tera::escape_html(renderer.table_class()),
        sections.join("\n")
    ))
}

/// Text shown in a cell for a record value.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
