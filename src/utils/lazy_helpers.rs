//! LazyFrame materialization helpers with column validation
//!
//! Input tables are exported by hand from spreadsheets, so header typos
//! are the most common failure. Every table is materialized through
//! `materialize_with_columns`, which names the missing header instead of
//! surfacing a bare Polars error.

use polars::prelude::*;
use anyhow::{Context, Result, anyhow};
use std::collections::HashSet;

/// Materialize LazyFrame with explicit column list and validation
///
/// # Arguments
/// * `lazy` - LazyFrame to materialize
/// * `columns` - Required column names
/// * `context` - Context for error messages (e.g., "products.csv")
///
/// # Returns
/// DataFrame with exactly the specified columns, in the given order
///
/// # Errors
/// Returns error if any required column is missing or materialization fails
pub fn materialize_with_columns(
    lazy: &LazyFrame,
    columns: &[&str],
    context: &str,
) -> Result<DataFrame> {
    // Check headers up front so the error lists what IS available
    let schema = lazy
        .clone()
        .collect_schema()
        .with_context(|| format!("{}: Failed to read schema", context))?;

    let actual_cols: HashSet<String> = schema
        .iter_names()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual_cols.contains(expected) {
            let mut available: Vec<_> = actual_cols.iter().cloned().collect();
            available.sort();
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context, expected, available
            ));
        }
    }

    let col_exprs: Vec<Expr> = columns.iter()
        .map(|&name| col(name))
        .collect();

    lazy
        .clone()
        .select(&col_exprs)
        .collect()
        .with_context(|| format!("{}: Failed to materialize columns {:?}", context, columns))
}

/// Column as optional floats; unparsable cells become `None`
pub fn f64_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("{}: Column '{}' is not numeric", context, name))?;

    let values = column.f64()?;
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Column as optional trimmed strings; blank cells become `None`
pub fn string_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .cast(&DataType::String)
        .with_context(|| format!("{}: Column '{}' cannot be read as text", context, name))?;

    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_with_columns_success() {
        let df = df![
            "Eq. Name" => &["Mixer", "Dryer"],
            "Eq. ID" => &["EQ-1", "EQ-2"],
            "Notes" => &["n1", "n2"],
        ].unwrap();

        let materialized = materialize_with_columns(
            &df.lazy(),
            &["Eq. Name", "Eq. ID"],
            "test",
        ).unwrap();

        assert_eq!(materialized.width(), 2);
        assert_eq!(materialized.height(), 2);
    }

    #[test]
    fn test_materialize_with_columns_missing() {
        let df = df![
            "Eq. Name" => &["Mixer"],
        ].unwrap();

        let result = materialize_with_columns(&df.lazy(), &["Eq. ID"], "equipment.csv");

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Eq. ID"));
        assert!(err_msg.contains("equipment.csv"));
    }

    #[test]
    fn test_f64_values_are_lenient() {
        let df = df![
            "Min Dose (mg)" => &[Some("10"), Some("n/a"), None, Some("2.5")],
        ].unwrap();

        let values = f64_values(&df, "Min Dose (mg)", "test").unwrap();
        assert_eq!(values, vec![Some(10.0), None, None, Some(2.5)]);
    }

    #[test]
    fn test_string_values_trim_and_drop_blanks() {
        let df = df![
            "Solubility" => &[Some(" Soluble "), Some("   "), None],
        ].unwrap();

        let values = string_values(&df, "Solubility", "test").unwrap();
        assert_eq!(values, vec![Some("Soluble".to_string()), None, None]);
    }
}
