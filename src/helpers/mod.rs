//! String-level helpers for wiring bundles into pages and sources

pub mod imports;
pub mod inject;

pub use imports::transform_imports;
pub use inject::{inject_script, inject_stylesheet};
