//! Tree grid library.
//!
//! Renders self-referential record sets (every record names its parent) as
//! a nested table. Pagination applies to root records only; each visible
//! root brings its whole subtree along, ordered depth-first.
//!
//! The `treegrid-server` binary serves one configured table over HTTP.

pub mod grid;
pub mod source;
pub mod view;
