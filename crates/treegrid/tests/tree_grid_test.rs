#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tree grid integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};

use treegrid::grid::{
    GridError, GridOptions, GridOutput, PageRequest, Record, TreeGrid, TreeNormalizer,
};
use treegrid::source::{DataSource, GridQuery, MemoryDataSource, Page, Predicate};
use treegrid_test_utils::{ids, records, test_record, trees};

fn options() -> GridOptions {
    GridOptions::new("id", "parent_id")
}

fn grid_over(source: Arc<MemoryDataSource>, options: GridOptions) -> TreeGrid {
    TreeGrid::builder(options)
        .data_source(source, GridQuery::new("node"))
        .build()
        .unwrap()
}

fn row_ids(output: &GridOutput) -> Vec<i64> {
    output
        .rows
        .iter()
        .map(|row| row.key.as_i64().unwrap())
        .collect()
}

fn page(number: u32, size: i64, options: &GridOptions) -> PageRequest {
    PageRequest::from_params(Some(number), Some(size), options)
}

// -------------------------------------------------------------------------
// Pagination
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_first_page_brings_whole_subtrees() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()));
    let grid = grid_over(source.clone(), options());

    let output = grid.render(&page(1, 2, grid.options())).await.unwrap();

    assert_eq!(row_ids(&output), vec![1, 2, 4, 3, 5]);
    assert_eq!(output.descendant_count, 3);

    let state = output.pagination.unwrap();
    assert_eq!(state.total_count, 3);
    assert_eq!(state.page_count, 2);

    let fields = output.summary.fields;
    assert_eq!(fields.begin, 1);
    assert_eq!(fields.end, 5);
    assert_eq!(fields.count, 5);
    assert_eq!(fields.total_count, 6);
    assert_eq!(
        output.summary.text,
        "Showing <b>1-5</b> of <b>6</b> items."
    );

    // One page query, then levels {2,3}, {4}, and the final empty round.
    assert_eq!(source.round_trips(), 4);
}

#[tokio::test]
async fn test_second_page() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()));
    let grid = grid_over(source, options());

    let output = grid.render(&page(2, 2, grid.options())).await.unwrap();

    assert_eq!(row_ids(&output), vec![6, 7]);
    let fields = output.summary.fields;
    assert_eq!(fields.begin, 3);
    assert_eq!(fields.end, 4);
    assert_eq!(fields.total_count, 4);
    assert_eq!(fields.page, 2);
}

#[tokio::test]
async fn test_page_beyond_range_is_clamped() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()));
    let grid = grid_over(source, options());

    let output = grid.render(&page(9, 2, grid.options())).await.unwrap();

    assert_eq!(output.pagination.unwrap().page, 1);
    assert_eq!(row_ids(&output), vec![6, 7]);
}

#[tokio::test]
async fn test_total_never_below_root_count() {
    let source = Arc::new(MemoryDataSource::new(trees::wide(5, 3)));
    let grid = grid_over(source, options());

    for number in 1..=3 {
        let output = grid.render(&page(number, 2, grid.options())).await.unwrap();
        let state = output.pagination.unwrap();
        assert!(output.summary.fields.total_count >= state.total_count);
        assert!(output.summary.fields.begin <= output.summary.fields.end);
    }
}

#[tokio::test]
async fn test_pagination_disabled_source_renders_everything() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()).without_pagination());
    let grid = grid_over(source.clone(), options());

    let output = grid.render(&page(1, 2, grid.options())).await.unwrap();

    assert!(output.pagination.is_none());
    assert_eq!(row_ids(&output), vec![1, 2, 4, 3, 5, 6, 7]);
    assert_eq!(output.descendant_count, 0);
    let fields = output.summary.fields;
    assert_eq!((fields.begin, fields.end), (1, 7));
    assert_eq!((fields.page, fields.page_count), (1, 1));
    assert_eq!(output.summary.text, "Total <b>7</b> items.");
    assert_eq!(source.round_trips(), 1);
}

#[tokio::test]
async fn test_all_page_size_bypasses_pagination() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()));
    let grid = grid_over(source.clone(), options());

    let request = PageRequest::from_params(Some(2), Some(-1), grid.options());
    let output = grid.render(&request).await.unwrap();

    assert!(output.pagination.is_none());
    assert_eq!(output.rows.len(), 7);
    assert_eq!(source.round_trips(), 1);
}

#[tokio::test]
async fn test_unpaginated_count_includes_orphans() {
    let mut data = trees::small_forest();
    data.push(test_record(50, Some(49)).build());
    let source = Arc::new(MemoryDataSource::new(data));
    let grid = grid_over(source, options());

    let output = grid.render(&PageRequest::all()).await.unwrap();

    assert_eq!(output.rows.len(), 7);
    assert_eq!(output.orphan_count, 1);
    assert_eq!(output.summary.fields.count, 8);
}

#[tokio::test]
async fn test_base_filters_apply_to_roots_and_descendants() {
    let data = vec![
        test_record(1, None).with_field("visible", json!(true)).build(),
        test_record(2, Some(1)).with_field("visible", json!(false)).build(),
        test_record(3, Some(1)).with_field("visible", json!(true)).build(),
        test_record(4, None).with_field("visible", json!(false)).build(),
    ];
    let source: Arc<dyn DataSource> = Arc::new(MemoryDataSource::new(data));
    let grid = TreeGrid::builder(options())
        .data_source(
            source,
            GridQuery::new("node").and_where(Predicate::equals("visible", true)),
        )
        .build()
        .unwrap();

    let output = grid.render(&page(1, 10, grid.options())).await.unwrap();
    assert_eq!(row_ids(&output), vec![1, 3]);
    assert_eq!(output.pagination.unwrap().total_count, 1);
}

#[tokio::test]
async fn test_non_null_root_sentinel() {
    let data = vec![
        test_record(1, Some(0)).build(),
        test_record(2, Some(1)).build(),
        test_record(3, Some(0)).build(),
    ];
    let source = Arc::new(MemoryDataSource::new(data));
    let grid = grid_over(
        source,
        GridOptions {
            root_value: json!(0),
            ..options()
        },
    );

    let output = grid.render(&page(1, 1, grid.options())).await.unwrap();
    assert_eq!(row_ids(&output), vec![1, 2]);
    assert_eq!(output.rows[0].parent_token, None);
    assert_eq!(
        output.rows[1].parent_token.as_deref(),
        Some("treegrid-parent-1")
    );
}

#[tokio::test]
async fn test_custom_field_names() {
    let data = vec![
        test_record(1, None)
            .with_field_names("uid", "owner")
            .build(),
        test_record(2, Some(1))
            .with_field_names("uid", "owner")
            .build(),
    ];
    let source = Arc::new(MemoryDataSource::new(data));
    let grid = grid_over(source, GridOptions::new("uid", "owner"));

    let output = grid.render(&page(1, 10, grid.options())).await.unwrap();
    assert_eq!(row_ids(&output), vec![1, 2]);
    assert_eq!(output.rows[1].node_token, "treegrid-2");
}

#[tokio::test]
async fn test_string_keys_and_loose_parent_references() {
    let data = vec![
        test_record(0, None).with_key(json!("a")).build(),
        test_record(0, None)
            .with_key(json!("b"))
            .with_parent(json!("a"))
            .build(),
        test_record(7, None).with_parent(json!("b")).build(),
        test_record(8, None).with_parent(json!("7")).build(),
    ];
    let source = Arc::new(MemoryDataSource::new(data));
    let grid = grid_over(source, options());

    let output = grid.render(&page(1, 10, grid.options())).await.unwrap();

    let keys: Vec<String> = output.rows.iter().map(|row| row.data_key()).collect();
    assert_eq!(keys, vec!["a", "b", "7", "8"]);
    assert_eq!(
        output.rows[3].parent_token.as_deref(),
        Some("treegrid-parent-7")
    );
    assert_eq!(output.descendant_count, 3);
}

#[tokio::test]
async fn test_aliased_query_with_qualified_parent_column() {
    let source = Arc::new(MemoryDataSource::new(trees::small_forest()));
    let query = GridQuery::new("node").aliased("n");
    let grid = TreeGrid::builder(GridOptions {
        parent_column_alias: Some("n.parent_id".to_string()),
        ..options()
    })
    .data_source(source, query.clone())
    .build()
    .unwrap();

    assert_eq!(grid.query(), &query);

    let output = grid.render(&page(1, 2, grid.options())).await.unwrap();
    assert_eq!(row_ids(&output), vec![1, 2, 4, 3, 5]);
}

// -------------------------------------------------------------------------
// Empty results
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_empty_source() {
    let source = Arc::new(MemoryDataSource::new(Vec::new()));
    let grid = grid_over(source.clone(), options());

    let output = grid.render(&PageRequest::first(grid.options())).await.unwrap();

    assert!(output.is_empty());
    assert!(output.summary.text.is_empty());
    assert_eq!(output.empty_text, "No results found.");
    // The page query runs; no descendant round trip is made.
    assert_eq!(source.round_trips(), 1);
}

// -------------------------------------------------------------------------
// Configuration and error propagation
// -------------------------------------------------------------------------

#[test]
fn test_missing_data_source_is_reported_first() {
    let err = TreeGrid::builder(GridOptions::new("", "")).build().unwrap_err();
    assert!(matches!(err, GridError::MissingDataSource));
}

/// Fails the page query or every descendant query.
struct FailingSource {
    fail_page: bool,
    page_calls: AtomicBool,
}

#[async_trait]
impl DataSource for FailingSource {
    fn pagination_enabled(&self) -> bool {
        true
    }

    async fn fetch_page(&self, _query: &GridQuery, page: u32, per_page: u32) -> Result<Page> {
        self.page_calls.store(true, Ordering::SeqCst);
        if self.fail_page {
            return Err(anyhow!("connection reset"));
        }
        Ok(Page {
            records: records(&[(1, None)]),
            state: treegrid::grid::PageState::new(page, per_page, 1),
        })
    }

    async fn fetch_all(&self, _query: &GridQuery) -> Result<Vec<Record>> {
        Err(anyhow!("statement timeout"))
    }
}

#[tokio::test]
async fn test_page_query_failure_propagates() {
    let source = Arc::new(FailingSource {
        fail_page: true,
        page_calls: AtomicBool::new(false),
    });
    let grid = TreeGrid::builder(options())
        .data_source(source.clone(), GridQuery::new("node"))
        .build()
        .unwrap();

    let err = grid
        .render(&PageRequest::first(grid.options()))
        .await
        .unwrap_err();

    assert!(source.page_calls.load(Ordering::SeqCst));
    match err {
        GridError::Source(e) => assert_eq!(e.to_string(), "connection reset"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_descendant_failure_aborts_render() {
    let source = Arc::new(FailingSource {
        fail_page: false,
        page_calls: AtomicBool::new(false),
    });
    let grid = TreeGrid::builder(options())
        .data_source(source, GridQuery::new("node"))
        .build()
        .unwrap();

    let err = grid
        .render(&PageRequest::first(grid.options()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "statement timeout");
}

// -------------------------------------------------------------------------
// Normalization
// -------------------------------------------------------------------------

/// Straightforward recursive depth-first walk.
fn reference_order(records: &[Value], target: &Value) -> Vec<i64> {
    let mut out = Vec::new();
    for record in records {
        let parent = &record["parent_id"];
        let matches = match (parent.as_i64(), target.as_i64()) {
            (Some(p), Some(t)) => p == t,
            (None, None) => parent.is_null() && target.is_null(),
            _ => false,
        };
        if matches {
            let id = record["id"].as_i64().unwrap();
            out.push(id);
            out.extend(reference_order(records, &json!(id)));
        }
    }
    out
}

#[test]
fn test_normalizer_matches_reference_walk() {
    let mut data = trees::wide(4, 3);
    data.extend(trees::small_forest());
    data.extend(records(&[(4001, Some(1001)), (4002, Some(4001)), (9, Some(999))]));
    // Deterministic shuffle: reverse, then interleave halves.
    data.reverse();
    let (left, right) = data.split_at(data.len() / 2);
    let mixed: Vec<Value> = right
        .iter()
        .zip(left.iter())
        .flat_map(|(a, b)| [a.clone(), b.clone()])
        .chain(right.iter().skip(left.len()).cloned())
        .collect();
    assert_eq!(mixed.len(), data.len());

    let options = options();
    let normalized = TreeNormalizer::new(&options).normalize(&mixed, &Value::Null);

    assert_eq!(ids(&normalized), reference_order(&mixed, &Value::Null));
    assert!(!ids(&normalized).contains(&9));
}

#[test]
fn test_every_child_follows_its_parent() {
    let data = trees::small_forest();
    let options = options();
    let normalized = TreeNormalizer::new(&options).normalize(&data, &Value::Null);
    let order = ids(&normalized);

    for record in &normalized {
        if let Some(parent) = record["parent_id"].as_i64() {
            let child_pos = order
                .iter()
                .position(|&id| Some(id) == record["id"].as_i64())
                .unwrap();
            let parent_pos = order.iter().position(|&id| id == parent).unwrap();
            assert!(parent_pos < child_pos);
        }
    }
}
