//! Tree grid page.
//!
//! `GET /` renders the configured table. Query parameters follow the pager
//! links: `page` (one-based) and `per-page` (the configured "all" value
//! shows every record on one page).

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::debug;

use treegrid::grid::{GridOptions, PageRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw query parameters; parsed by hand so bad values get a 400.
#[derive(Debug, Default, Deserialize)]
struct GridParams {
    page: Option<String>,
    #[serde(rename = "per-page")]
    per_page: Option<String>,
}

impl GridParams {
    fn page_request(&self, options: &GridOptions) -> AppResult<PageRequest> {
        let page = parse_param::<u32>("page", self.page.as_deref())?;
        let per_page = parse_param::<i64>("per-page", self.per_page.as_deref())?;
        Ok(PageRequest::from_params(page, per_page, options))
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, value: Option<&str>) -> AppResult<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid {name}: {v}"))),
    }
}

async fn render_grid(
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> AppResult<Html<String>> {
    let grid = state.grid();
    let request = params.page_request(grid.options())?;
    debug!(page = request.page, size = ?request.page_size, "rendering tree grid");

    let output = grid.render(&request).await?;
    let body = state.renderer().render_grid(&output)?;

    Ok(Html(page_html(&body)))
}

fn page_html(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Tree grid</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

/// Create the tree grid router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(render_grid))
}
