//! Summary counts and text.
//!
//! The data source only counts roots, but a page renders its roots plus every
//! descendant. The reported total adds the descendants back in; the visible
//! range is derived from the rows actually rendered.

use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera};

use super::error::{GridError, GridResult, describe};
use super::pagination::PageState;

/// Default summary for paginated grids.
pub const PAGED_SUMMARY: &str = "Showing <b>{{ begin | number }}-{{ end | number }}</b> of \
     <b>{{ totalCount | number }}</b> {{ totalCount | plural(one=\"item\", other=\"items\") }}.";

/// Default summary when everything is on one page.
pub const TOTAL_SUMMARY: &str =
    "Total <b>{{ count | number }}</b> {{ count | plural(one=\"item\", other=\"items\") }}.";

/// Values available to summary templates.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFields {
    /// One-based position of the first rendered row.
    pub begin: u64,
    /// One-based position of the last rendered row.
    pub end: u64,
    /// Rows rendered for this page.
    pub count: u64,
    /// Roots in the source plus descendants fetched for this page.
    pub total_count: u64,
    /// One-based page number.
    pub page: u32,
    /// Number of pages.
    pub page_count: u32,
}

impl SummaryFields {
    /// Fields for a paginated render.
    ///
    /// `count` is the number of rendered rows (roots and descendants),
    /// `descendants` the number of records fetched outside paging.
    pub fn paginated(state: &PageState, count: u64, descendants: u64) -> Self {
        let mut begin = state.offset() + 1;
        let end = (begin + count).saturating_sub(1);
        if begin > end {
            begin = end;
        }

        Self {
            begin,
            end,
            count,
            total_count: state.total_count + descendants,
            page: state.page + 1,
            page_count: state.page_count,
        }
    }

    /// Fields when pagination does not apply.
    ///
    /// Everything is on the single page, so `end` is the row count.
    pub fn unpaginated(count: u64) -> Self {
        Self {
            begin: 1,
            end: count,
            count,
            total_count: count,
            page: 1,
            page_count: 1,
        }
    }
}

/// Summary counts and the formatted text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub fields: SummaryFields,
    /// Empty when there are no rows or the summary is disabled.
    pub text: String,
}

/// Formats summary templates.
pub trait SummaryFormatter: Send + Sync {
    /// Check that a template is usable before any rendering happens.
    fn validate(&self, template: &str) -> GridResult<()>;

    /// Substitute the summary fields into a template.
    fn format(&self, template: &str, fields: &SummaryFields) -> GridResult<String>;
}

/// Tera-backed summary formatter.
///
/// Templates see `begin`, `end`, `count`, `totalCount`, `page` and
/// `pageCount`, plus the `number` and `plural(one=…, other=…)` filters.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeraSummaryFormatter;

impl TeraSummaryFormatter {
    pub fn new() -> Self {
        Self
    }

    fn compile(template: &str) -> Result<Tera, tera::Error> {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        tera.add_raw_template("summary", template)?;
        Ok(tera)
    }

    /// Register summary filters.
    fn register_filters(tera: &mut Tera) {
        // Thousands grouping: 1234567 -> 1,234,567
        tera.register_filter(
            "number",
            |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let Some(n) = value.as_i64() else {
                    return Ok(value.clone());
                };
                Ok(tera::Value::String(group_thousands(n)))
            },
        );

        tera.register_filter(
            "plural",
            |value: &tera::Value, args: &HashMap<String, tera::Value>| {
                let n = tera::try_get_value!("plural", "value", i64, value);
                let form = if n == 1 { "one" } else { "other" };
                let text = args
                    .get(form)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| tera::Error::msg(format!("plural filter needs `{form}`")))?;
                Ok(tera::Value::String(text.to_string()))
            },
        );
    }
}

impl SummaryFormatter for TeraSummaryFormatter {
    fn validate(&self, template: &str) -> GridResult<()> {
        if let Some(placeholder) = bare_placeholder(template) {
            return Err(GridError::InvalidFormatter(format!(
                "`{placeholder}` is not a template expression; write fields as `{{{{ field }}}}`"
            )));
        }
        // Unknown filters and variables only surface at render time.
        let sample = SummaryFields::unpaginated(1);
        Self::compile(template)
            .and_then(|tera| {
                let context = Context::from_serialize(sample)?;
                tera.render("summary", &context)
            })
            .map(|_| ())
            .map_err(|e| GridError::InvalidFormatter(describe(&e)))
    }

    fn format(&self, template: &str, fields: &SummaryFields) -> GridResult<String> {
        let tera =
            Self::compile(template).map_err(|e| GridError::InvalidFormatter(describe(&e)))?;
        let context =
            Context::from_serialize(fields).map_err(|e| GridError::Render(describe(&e)))?;
        tera.render("summary", &context)
            .map_err(|e| GridError::Render(describe(&e)))
    }
}

/// Produce the summary for a render.
///
/// No rows means no summary. A configured template replaces the default;
/// an empty configured template disables the summary.
pub fn summarize(
    formatter: &dyn SummaryFormatter,
    custom: Option<&str>,
    fields: SummaryFields,
    paginated: bool,
) -> GridResult<Summary> {
    let template = match custom {
        Some(template) => template,
        None if paginated => PAGED_SUMMARY,
        None => TOTAL_SUMMARY,
    };

    let text = if fields.count == 0 || template.is_empty() {
        String::new()
    } else {
        formatter.format(template, &fields)?
    };

    Ok(Summary { fields, text })
}

/// Fields a summary template can reference.
const FIELDS: [&str; 6] = ["begin", "end", "count", "totalCount", "page", "pageCount"];

/// First `{field}` placeholder written without template delimiters, e.g.
/// `{begin}` or `{totalCount, number}`.
fn bare_placeholder(template: &str) -> Option<&str> {
    let bytes = template.as_bytes();
    template.match_indices('{').find_map(|(start, _)| {
        if start > 0 && bytes[start - 1] == b'{' {
            return None;
        }
        let rest = &template[start + 1..];
        let inner = &rest[..rest.find('}')?];
        let name = inner.split(',').next()?.trim();
        FIELDS
            .contains(&name)
            .then_some(&template[start..start + inner.len() + 2])
    })
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn total_includes_descendants() {
        let state = PageState::new(0, 10, 1);
        let fields = SummaryFields::paginated(&state, 3, 2);

        assert_eq!(fields.total_count, 3);
        assert!(fields.total_count >= state.total_count);
        assert_eq!(fields.begin, 1);
        assert_eq!(fields.end, 3);
        assert_eq!(fields.page, 1);
        assert_eq!(fields.page_count, 1);
    }

    #[test]
    fn range_on_later_page() {
        let state = PageState::new(2, 10, 45);
        let fields = SummaryFields::paginated(&state, 14, 4);

        assert_eq!(fields.begin, 21);
        assert_eq!(fields.end, 34);
        assert_eq!(fields.page, 3);
        assert_eq!(fields.page_count, 5);
        assert_eq!(fields.total_count, 49);
    }

    #[test]
    fn empty_page_clamps_begin() {
        let state = PageState::new(0, 10, 0);
        let fields = SummaryFields::paginated(&state, 0, 0);
        assert!(fields.begin <= fields.end);
    }

    #[test]
    fn unpaginated_fields() {
        let fields = SummaryFields::unpaginated(7);
        assert_eq!(fields.begin, 1);
        assert_eq!(fields.end, 7);
        assert_eq!(fields.count, 7);
        assert_eq!(fields.total_count, 7);
        assert_eq!(fields.page, 1);
        assert_eq!(fields.page_count, 1);
    }

    #[test]
    fn default_paged_text() {
        let state = PageState::new(0, 10, 1);
        let fields = SummaryFields::paginated(&state, 3, 2);
        let summary = summarize(&TeraSummaryFormatter, None, fields, true).unwrap();

        assert_eq!(summary.text, "Showing <b>1-3</b> of <b>3</b> items.");
    }

    #[test]
    fn default_total_text_singular() {
        let fields = SummaryFields::unpaginated(1);
        let summary = summarize(&TeraSummaryFormatter, None, fields, false).unwrap();

        assert_eq!(summary.text, "Total <b>1</b> item.");
    }

    #[test]
    fn number_grouping() {
        let fields = SummaryFields::unpaginated(1_234_567);
        let summary = summarize(&TeraSummaryFormatter, None, fields, false).unwrap();
        assert_eq!(summary.text, "Total <b>1,234,567</b> items.");

        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(-12345), "-12,345");
    }

    #[test]
    fn custom_template() {
        let fields = SummaryFields::unpaginated(4);
        let summary = summarize(
            &TeraSummaryFormatter,
            Some("Page {{ page }} of {{ pageCount }} ({{ totalCount }})"),
            fields,
            false,
        )
        .unwrap();
        assert_eq!(summary.text, "Page 1 of 1 (4)");
    }

    #[test]
    fn empty_template_disables_summary() {
        let fields = SummaryFields::unpaginated(4);
        let summary = summarize(&TeraSummaryFormatter, Some(""), fields, false).unwrap();
        assert!(summary.text.is_empty());
    }

    #[test]
    fn no_rows_no_summary() {
        let summary = summarize(
            &TeraSummaryFormatter,
            None,
            SummaryFields::unpaginated(0),
            false,
        )
        .unwrap();
        assert!(summary.text.is_empty());
    }

    #[test]
    fn invalid_template_rejected() {
        let err = TeraSummaryFormatter
            .validate("Showing {{ begin | no_such_filter }}")
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidFormatter(_)));

        let err = TeraSummaryFormatter.validate("{{ unclosed").unwrap_err();
        assert!(matches!(err, GridError::InvalidFormatter(_)));
    }

    #[test]
    fn single_brace_fields_rejected() {
        let err = TeraSummaryFormatter
            .validate("Showing {begin}-{end} of {totalCount}")
            .unwrap_err();
        match err {
            GridError::InvalidFormatter(message) => {
                assert!(message.contains("`{begin}`"), "{message}");
                assert!(message.contains("{{ field }}"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(
            TeraSummaryFormatter
                .validate("Total {count, number}.")
                .is_err()
        );
    }

    #[test]
    fn braces_around_other_text_allowed() {
        assert_eq!(bare_placeholder("{{ begin }}-{{ end }}"), None);
        assert_eq!(bare_placeholder("{% if page %}{note}{% endif %}"), None);
        assert_eq!(bare_placeholder("a {pageCount} b"), Some("{pageCount}"));
        TeraSummaryFormatter
            .validate("Page {{ page }} of {{ pageCount }} {items}")
            .unwrap();
    }
}
