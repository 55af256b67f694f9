//! Tree grid error types.

use thiserror::Error;

/// Errors raised while configuring or rendering a tree grid.
///
/// Configuration variants are raised by [`TreeGridBuilder::build`] before
/// any data is fetched. Data source failures pass through unchanged.
///
/// [`TreeGridBuilder::build`]: super::TreeGridBuilder::build
#[derive(Debug, Error)]
pub enum GridError {
    #[error("the data source must be set")]
    MissingDataSource,

    #[error("the key column name must be specified")]
    MissingKeyColumn,

    #[error("the parent column name must be specified")]
    MissingParentColumn,

    #[error("invalid summary formatter configuration: {0}")]
    InvalidFormatter(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Flatten an error and its sources into one line.
///
/// Tera reports the useful detail (line, unknown filter) in the source chain.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
