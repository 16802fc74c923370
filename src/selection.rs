//! Worst-case product selection
//!
//! Two independent single-winner scans over the classified product table:
//! - previous worst case: highest worst-case rating
//! - next worst case: lowest minimum-batch / maximum-dose ratio
//!
//! Products whose key is undefined are skipped. Ties go to the product
//! that appears first in the input table.

use crate::error::{CarryoverError, CarryoverResult};
use crate::types::ClassifiedProduct;
use serde::{Deserialize, Serialize};

/// Both selected worst-case products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstCasePair {
    /// Product being cleaned out (highest rating)
    pub previous: ClassifiedProduct,
    /// Product manufactured next (lowest batch/dose ratio)
    pub next: ClassifiedProduct,
}

/// Product with the maximum worst-case rating
pub fn previous_worst_case(products: &[ClassifiedProduct]) -> CarryoverResult<&ClassifiedProduct> {
    if products.is_empty() {
        return Err(CarryoverError::EmptyTable { table: "product" });
    }

    let mut best: Option<(&ClassifiedProduct, u32)> = None;
    for product in products {
        let Some(rating) = product.worst_case_rating else {
            continue;
        };
        // Strictly greater keeps the earliest product on ties
        if best.map_or(true, |(_, r)| rating > r) {
            best = Some((product, rating));
        }
    }

    best.map(|(p, _)| p).ok_or(CarryoverError::NoRankableProduct {
        criterion: "worst-case rating",
    })
}

/// Product with the minimum batch/dose ratio
pub fn next_worst_case(products: &[ClassifiedProduct]) -> CarryoverResult<&ClassifiedProduct> {
    if products.is_empty() {
        return Err(CarryoverError::EmptyTable { table: "product" });
    }

    let mut best: Option<(&ClassifiedProduct, f64)> = None;
    for product in products {
        let Some(ratio) = product.batch_dose_ratio.filter(|r| !r.is_nan()) else {
            continue;
        };
        if best.map_or(true, |(_, r)| ratio < r) {
            best = Some((product, ratio));
        }
    }

    best.map(|(p, _)| p).ok_or(CarryoverError::NoRankableProduct {
        criterion: "batch size / dose ratio",
    })
}

/// Run both selections
pub fn select_worst_cases(products: &[ClassifiedProduct]) -> CarryoverResult<WorstCasePair> {
    let previous = previous_worst_case(products)?;
    let next = next_worst_case(products)?;

    tracing::info!(
        "Worst cases: previous '{}' (rating {:?}), next '{}' (ratio {:?})",
        previous.name(),
        previous.worst_case_rating,
        next.name(),
        next.batch_dose_ratio
    );

    Ok(WorstCasePair {
        previous: previous.clone(),
        next: next.clone(),
    })
}
