//! Shared helpers
//!
//! - LazyFrame helpers: Safe materialization with column validation and
//!   lenient per-column extraction

pub mod lazy_helpers;

pub use lazy_helpers::{f64_values, materialize_with_columns, string_values};
