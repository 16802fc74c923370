//! Cleaning validation carryover limits
//!
//! Takes a product table, an equipment table, and four rating tables, and
//! produces the limits for cleaning validation of shared equipment:
//! - `grouping/`: Risk-group lookup and worst-case rating per product
//! - `selection`: Previous/next worst-case product selection
//! - `limits/`: MACO candidates, swab limit, per-equipment rinse limits
//! - `pipeline`: One forward run over an input bundle
//! - `data`: CSV loading with Polars
//! - `report/`: Rounded views with Markdown and JSON output

pub mod error;
pub mod types;
pub mod config;
pub mod utils;
pub mod data;
pub mod grouping;
pub mod selection;
pub mod limits;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use error::{CarryoverError, CarryoverResult};
pub use types::{
    ClassifiedProduct, EquipmentItem, Group, MacoMethod, MacoResult, Product, RinseLimitRow, SwabLimit,
};
pub use config::{CalculationPolicy, RangeOverlapPolicy, SwabAreaSource};
pub use data::InputBundle;
pub use grouping::RatingCriteria;
pub use selection::WorstCasePair;
pub use pipeline::{CarryoverCalculator, CleaningLimits};
pub use report::{CleaningReport, JsonFormatter, MarkdownFormatter, ReportView};
