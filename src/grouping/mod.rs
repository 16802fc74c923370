//! Product risk grouping
//!
//! - `tables`: validated rating criteria lookup tables
//! - `classifier`: description/range lookups and product enrichment

pub mod tables;
pub mod classifier;

pub use tables::{DescriptionRow, DescriptionTable, RangeRow, RangeTable, RatingCriteria, TableRows};
pub use classifier::{
    classify_by_description, classify_by_range, classify_product, classify_products,
    classify_text_by_range, normalize_description, parse_number,
};
