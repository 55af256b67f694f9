//! Tera-backed HTML table renderer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tera::{Context, Tera};
use tracing::debug;

use super::pager::Pager;
use super::{TABLE_CLASS, TableRenderer, cell_text, render_table};
use crate::grid::{GridError, GridOutput, GridResult, TaggedRow, describe, types::field};

const TEMPLATES: [(&str, &str); 6] = [
    ("row.html", include_str!("../../templates/row.html")),
    ("empty.html", include_str!("../../templates/empty.html")),
    ("header.html", include_str!("../../templates/header.html")),
    ("footer.html", include_str!("../../templates/footer.html")),
    ("pager.html", include_str!("../../templates/pager.html")),
    ("grid.html", include_str!("../../templates/grid.html")),
];

/// Markup hook called with each row; empty output is skipped.
pub type RowHook = Arc<dyn Fn(&TaggedRow) -> String + Send + Sync>;

/// Extra `<tr>` attributes, merged with the tree markup.
///
/// `class` goes ahead of the row tokens and `style` ahead of the collapsed
/// `display: none;`. `data-key` is always the row key. `true` renders a bare
/// attribute; `false` and `null` omit it.
#[derive(Clone)]
pub enum RowOptions {
    /// Same attributes on every row.
    Static(Map<String, Value>),
    /// Attributes computed per row.
    Dynamic(Arc<dyn Fn(&TaggedRow) -> Map<String, Value> + Send + Sync>),
}

impl RowOptions {
    pub fn dynamic(
        options: impl Fn(&TaggedRow) -> Map<String, Value> + Send + Sync + 'static,
    ) -> Self {
        Self::Dynamic(Arc::new(options))
    }

    /// Attributes for one row.
    pub fn attributes(&self, row: &TaggedRow) -> Map<String, Value> {
        match self {
            Self::Static(options) => options.clone(),
            Self::Dynamic(options) => options(row),
        }
    }
}

impl fmt::Debug for RowOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(options) => f.debug_tuple("Static").field(options).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct RowAttribute {
    name: String,
    value: Option<String>,
}

/// `<tr>` attributes once row options and tree markup are merged.
#[derive(Debug, PartialEq, Eq)]
struct RowAttributes {
    classes: String,
    style: Option<String>,
    extra: Vec<RowAttribute>,
}

impl RowAttributes {
    fn merge(row: &TaggedRow, mut options: Map<String, Value>) -> Self {
        let class = options.remove("class").map(|v| option_text(&v)).unwrap_or_default();
        let mut classes: Vec<&str> = class.split_whitespace().collect();
        classes.extend(row.tokens());

        let mut styles = Vec::new();
        if let Some(style) = options.remove("style") {
            let style = option_text(&style);
            let style = style.trim().trim_end_matches(';').trim_end();
            if !style.is_empty() {
                styles.push(format!("{style};"));
            }
        }
        if row.hidden {
            styles.push("display: none;".to_string());
        }

        options.remove("data-key");
        let extra = options
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::Null | Value::Bool(false) => None,
                Value::Bool(true) => Some(RowAttribute { name, value: None }),
                other => Some(RowAttribute {
                    name,
                    value: Some(option_text(&other)),
                }),
            })
            .collect();

        Self {
            classes: classes.join(" "),
            style: (!styles.is_empty()).then(|| styles.join(" ")),
            extra,
        }
    }
}

/// Option value as attribute text; lists are space-separated.
fn option_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        other => cell_text(other),
    }
}

/// A table column bound to a record field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Record field shown in the column (dotted paths allowed).
    pub attribute: String,

    /// Header label; defaults to the attribute name.
    #[serde(default)]
    pub label: Option<String>,

    /// Footer text.
    #[serde(default)]
    pub footer: Option<String>,
}

impl Column {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            label: None,
            footer: None,
        }
    }

    pub fn labeled(attribute: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(attribute)
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.attribute)
    }
}

/// HTML table renderer.
pub struct HtmlTableRenderer {
    tera: Tera,
    columns: Vec<Column>,
    show_header: bool,
    show_footer: bool,
    table_class: String,
    id: String,
    pager: Pager,
    row_options: Option<RowOptions>,
    before_row: Option<RowHook>,
    after_row: Option<RowHook>,
}

impl fmt::Debug for HtmlTableRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlTableRenderer")
            .field("columns", &self.columns)
            .field("show_header", &self.show_header)
            .field("show_footer", &self.show_footer)
            .field("table_class", &self.table_class)
            .field("id", &self.id)
            .field("row_options", &self.row_options)
            .finish_non_exhaustive()
    }
}

impl HtmlTableRenderer {
    /// Create a renderer for the given columns.
    pub fn new(columns: Vec<Column>) -> GridResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| GridError::Render(describe(&e)))?;

        debug!(columns = columns.len(), "html table renderer ready");

        Ok(Self {
            tera,
            columns,
            show_header: true,
            show_footer: false,
            table_class: TABLE_CLASS.to_string(),
            id: "treegrid".to_string(),
            pager: Pager::default(),
            row_options: None,
            before_row: None,
            after_row: None,
        })
    }

    pub fn with_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn with_footer(mut self, show: bool) -> Self {
        self.show_footer = show;
        self
    }

    pub fn with_table_class(mut self, class: impl Into<String>) -> Self {
        self.table_class = class.into();
        self
    }

    /// Element id of the grid container.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_pager(mut self, pager: Pager) -> Self {
        self.pager = pager;
        self
    }

    pub fn with_row_options(mut self, options: RowOptions) -> Self {
        self.row_options = Some(options);
        self
    }

    pub fn with_before_row(mut self, hook: RowHook) -> Self {
        self.before_row = Some(hook);
        self
    }

    pub fn with_after_row(mut self, hook: RowHook) -> Self {
        self.after_row = Some(hook);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Render the whole grid: toggle, summary, table, pager.
    ///
    /// The client options are emitted as an HTML-escaped JSON attribute.
    pub fn render_grid(&self, output: &GridOutput) -> GridResult<String> {
        let table = render_table(self, output)?;

        let pager = match &output.pagination {
            Some(state) => {
                let links = self.pager.links(state);
                if links.is_empty() {
                    String::new()
                } else {
                    let mut context = Context::new();
                    context.insert("links", &links);
                    self.render("pager.html", &context)?
                }
            }
            None => String::new(),
        };

        let mut context = Context::new();
        context.insert("id", &self.id);
        context.insert("client_options", &output.client_options.to_string());
        context.insert("toggle", &output.collapse_toggle);
        context.insert("summary", &output.summary.text);
        context.insert("table", &table);
        context.insert("pager", &pager);
        self.render("grid.html", &context)
    }

    fn render(&self, template: &str, context: &Context) -> GridResult<String> {
        self.tera
            .render(template, context)
            .map(|html| html.trim_end().to_string())
            .map_err(|e| GridError::Render(describe(&e)))
    }
}

impl TableRenderer for HtmlTableRenderer {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn render_header(&self) -> GridResult<Option<String>> {
        if !self.show_header {
            return Ok(None);
        }
        let labels: Vec<&str> = self.columns.iter().map(Column::label).collect();
        let mut context = Context::new();
        context.insert("labels", &labels);
        self.render("header.html", &context).map(Some)
    }

    fn render_row(&self, row: &TaggedRow) -> GridResult<String> {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|column| cell_text(field(&row.record, &column.attribute)))
            .collect();

        let options = self
            .row_options
            .as_ref()
            .map(|options| options.attributes(row))
            .unwrap_or_default();
        let attributes = RowAttributes::merge(row, options);

        let mut context = Context::new();
        context.insert("key", &row.data_key());
        context.insert("classes", &attributes.classes);
        context.insert("attributes", &attributes.extra);
        context.insert("style", &attributes.style);
        context.insert("cells", &cells);
        self.render("row.html", &context)
    }

    fn render_footer(&self) -> GridResult<Option<String>> {
        if !self.show_footer {
            return Ok(None);
        }
        let cells: Vec<&str> = self
            .columns
            .iter()
            .map(|column| column.footer.as_deref().unwrap_or(""))
            .collect();
        let mut context = Context::new();
        context.insert("cells", &cells);
        self.render("footer.html", &context).map(Some)
    }

    fn render_empty(&self, text: &str) -> GridResult<String> {
        let mut context = Context::new();
        context.insert("colspan", &self.column_count());
        context.insert("text", text);
        self.render("empty.html", &context)
    }

    fn before_row(&self, row: &TaggedRow) -> Option<String> {
        self.before_row.as_ref().map(|hook| hook(row))
    }

    fn after_row(&self, row: &TaggedRow) -> Option<String> {
        self.after_row.as_ref().map(|hook| hook(row))
    }

    fn table_class(&self) -> &str {
        &self.table_class
    }
}
