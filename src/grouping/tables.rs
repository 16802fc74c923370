//! Rating criteria lookup tables
//!
//! Four tables map product attributes to risk groups:
//! - Solubility: description → group
//! - Dose: minimum dose range (mg) → group
//! - Toxicity: ADE/PDE range (µg/day) → group
//! - Cleaning: "hardest to clean" description → group
//!
//! Range rows are inclusive at both ends. Overlaps are detected when the
//! table is built; whether they are tolerated is a policy decision
//! (see `RangeOverlapPolicy`).

use crate::config::RangeOverlapPolicy;
use crate::error::{CarryoverError, CarryoverResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Description tables
// ============================================================================

/// `{description, group}` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRow {
    pub description: String,
    pub group: u32,
}

/// String-match lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRows<DescriptionRow>", into = "TableRows<DescriptionRow>")]
pub struct DescriptionTable {
    name: String,
    rows: Vec<DescriptionRow>,
}

impl DescriptionTable {
    pub fn new(name: impl Into<String>, rows: Vec<DescriptionRow>) -> CarryoverResult<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(CarryoverError::EmptyTable { table: table_label(&name) });
        }
        Ok(Self { name, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[DescriptionRow] {
        &self.rows
    }
}

// ============================================================================
// Range tables
// ============================================================================

/// `{min, max, group}` row, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRow {
    pub min: f64,
    pub max: f64,
    pub group: u32,
}

impl RangeRow {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn overlaps(&self, other: &RangeRow) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Numeric range lookup table
///
/// Every row has finite bounds with `min <= max`. Pairs of rows sharing
/// at least one value are recorded in `overlaps()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRows<RangeRow>", into = "TableRows<RangeRow>")]
pub struct RangeTable {
    name: String,
    rows: Vec<RangeRow>,
    #[serde(skip)]
    overlaps: Vec<(usize, usize)>,
}

impl RangeTable {
    pub fn new(name: impl Into<String>, rows: Vec<RangeRow>) -> CarryoverResult<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(CarryoverError::EmptyTable { table: table_label(&name) });
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if !row.min.is_finite() || !row.max.is_finite() || row.min > row.max {
                return Err(CarryoverError::InvalidRange {
                    table: name,
                    row: row_idx,
                    min: row.min,
                    max: row.max,
                });
            }
        }

        let mut overlaps = Vec::new();
        for i in 0..rows.len() {
            for j in i + 1..rows.len() {
                if rows[i].overlaps(&rows[j]) {
                    overlaps.push((i, j));
                }
            }
        }

        Ok(Self { name, rows, overlaps })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[RangeRow] {
        &self.rows
    }

    /// Row index pairs `(earlier, later)` whose ranges share a value
    pub fn overlaps(&self) -> &[(usize, usize)] {
        &self.overlaps
    }

    /// Apply the overlap policy: log under first-match, fail under reject
    pub fn check_overlaps(&self, policy: RangeOverlapPolicy) -> CarryoverResult<()> {
        let Some(&(first, second)) = self.overlaps.first() else {
            return Ok(());
        };

        match policy {
            RangeOverlapPolicy::Reject => Err(CarryoverError::OverlappingRanges {
                table: self.name.clone(),
                first,
                second,
            }),
            RangeOverlapPolicy::FirstMatch => {
                for (a, b) in &self.overlaps {
                    tracing::warn!(
                        "{} table rows {} and {} overlap; row {} wins on shared values",
                        self.name, a, b, a
                    );
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Criteria bundle
// ============================================================================

/// The four rating criteria tables used for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingCriteria {
    pub solubility: DescriptionTable,
    pub dose: RangeTable,
    pub toxicity: RangeTable,
    pub cleaning: DescriptionTable,
}

impl RatingCriteria {
    pub fn check_overlaps(&self, policy: RangeOverlapPolicy) -> CarryoverResult<()> {
        self.dose.check_overlaps(policy)?;
        self.toxicity.check_overlaps(policy)
    }
}

/// Unvalidated serialized form shared by both table kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRows<R> {
    pub name: String,
    pub rows: Vec<R>,
}

impl TryFrom<TableRows<DescriptionRow>> for DescriptionTable {
    type Error = CarryoverError;

    fn try_from(raw: TableRows<DescriptionRow>) -> CarryoverResult<Self> {
        DescriptionTable::new(raw.name, raw.rows)
    }
}

impl From<DescriptionTable> for TableRows<DescriptionRow> {
    fn from(table: DescriptionTable) -> Self {
        TableRows { name: table.name, rows: table.rows }
    }
}

impl TryFrom<TableRows<RangeRow>> for RangeTable {
    type Error = CarryoverError;

    fn try_from(raw: TableRows<RangeRow>) -> CarryoverResult<Self> {
        RangeTable::new(raw.name, raw.rows)
    }
}

impl From<RangeTable> for TableRows<RangeRow> {
    fn from(table: RangeTable) -> Self {
        TableRows { name: table.name, rows: table.rows }
    }
}

/// Map a table name onto the static label used in `EmptyTable`
fn table_label(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "solubility" => "Solubility",
        "dose" => "Dose",
        "toxicity" => "Toxicity",
        "cleaning" => "Cleaning",
        _ => "lookup",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(min: f64, max: f64, group: u32) -> RangeRow {
        RangeRow { min, max, group }
    }

    #[test]
    fn test_range_table_rejects_inverted_rows() {
        let err = RangeTable::new("Dose", vec![row(0.0, 10.0, 1), row(50.0, 20.0, 2)]).unwrap_err();
        assert_eq!(
            err,
            CarryoverError::InvalidRange {
                table: "Dose".to_string(),
                row: 1,
                min: 50.0,
                max: 20.0,
            }
        );

        assert!(RangeTable::new("Dose", vec![row(f64::NAN, 1.0, 1)]).is_err());
        assert!(RangeTable::new("Dose", vec![]).is_err());
    }

    #[test]
    fn test_overlap_detection() {
        // Contiguous inclusive bounds share the boundary value
        let table = RangeTable::new(
            "Toxicity",
            vec![row(0.0, 10.0, 1), row(10.0, 100.0, 2), row(101.0, 1000.0, 3)],
        )
        .unwrap();
        assert_eq!(table.overlaps(), &[(0, 1)]);

        assert!(table.check_overlaps(RangeOverlapPolicy::FirstMatch).is_ok());
        assert_eq!(
            table.check_overlaps(RangeOverlapPolicy::Reject),
            Err(CarryoverError::OverlappingRanges {
                table: "Toxicity".to_string(),
                first: 0,
                second: 1,
            })
        );

        let disjoint = RangeTable::new("Dose", vec![row(0.0, 9.99, 1), row(10.0, 100.0, 2)]).unwrap();
        assert!(disjoint.overlaps().is_empty());
        assert!(disjoint.check_overlaps(RangeOverlapPolicy::Reject).is_ok());
    }

    #[test]
    fn test_tables_deserialize_through_validation() {
        let json = r#"{"name": "Dose", "rows": [{"min": 5, "max": 1, "group": 1}]}"#;
        assert!(serde_json::from_str::<RangeTable>(json).is_err());

        let json = r#"{"name": "Dose", "rows": [{"min": 0, "max": 10, "group": 1}, {"min": 5, "max": 20, "group": 2}]}"#;
        let table: RangeTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.overlaps(), &[(0, 1)]);

        let json = r#"{"name": "Solubility", "rows": []}"#;
        assert!(serde_json::from_str::<DescriptionTable>(json).is_err());
    }
}
