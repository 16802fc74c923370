//! Error taxonomy for carryover calculations
//!
//! Unassigned classifications are NOT errors: they travel as
//! `Group::Unassigned` through the product table. Everything here aborts
//! the whole run; there is no partial result.

use thiserror::Error;

/// Errors raised by the classification and calculation pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CarryoverError {
    #[error("{table} table is empty")]
    EmptyTable { table: &'static str },

    #[error("no product has a defined {criterion}; cannot select a worst case")]
    NoRankableProduct { criterion: &'static str },

    #[error("product '{product}' is missing required value '{field}'")]
    MissingValue { product: String, field: &'static str },

    #[error("'{item}' has invalid {field}: {value}")]
    InvalidValue {
        item: String,
        field: &'static str,
        value: f64,
    },

    #[error("{quantity} must be positive, got {value}")]
    NonPositiveDenominator { quantity: String, value: f64 },

    #[error("{table} table row {row} has invalid range [{min}, {max}]")]
    InvalidRange {
        table: String,
        row: usize,
        min: f64,
        max: f64,
    },

    #[error("{table} table rows {first} and {second} overlap")]
    OverlappingRanges {
        table: String,
        first: usize,
        second: usize,
    },

    #[error("reference product '{name}' not found in product table")]
    UnknownProduct { name: String },

    #[error("invalid calculation policy: {name} = {value}")]
    InvalidPolicy { name: &'static str, value: f64 },
}

pub type CarryoverResult<T> = Result<T, CarryoverError>;

/// Require a strictly positive, finite denominator
pub(crate) fn positive_denominator(quantity: impl Into<String>, value: f64) -> CarryoverResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CarryoverError::NonPositiveDenominator {
            quantity: quantity.into(),
            value,
        })
    }
}
