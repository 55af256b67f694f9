//! HTTP route handlers.

pub mod grid;
pub mod health;
