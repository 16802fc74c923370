//! Group classification
//!
//! Pure lookups of a raw attribute against one rating table. A value that
//! is missing, cannot be read as a number, or matches no row comes back
//! as `Group::Unassigned`; classification itself never fails.

use crate::grouping::tables::{DescriptionTable, RangeTable, RatingCriteria};
use crate::types::{ClassifiedProduct, Group, Product};

/// Trim and case-fold a description for comparison
pub fn normalize_description(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Exact, case-insensitive, trim-insensitive description match
///
/// First matching row wins.
pub fn classify_by_description(value: Option<&str>, table: &DescriptionTable) -> Group {
    let Some(value) = value else {
        return Group::Unassigned;
    };
    let needle = normalize_description(value);
    if needle.is_empty() {
        return Group::Unassigned;
    }

    table
        .rows()
        .iter()
        .find(|row| normalize_description(&row.description) == needle)
        .map_or(Group::Unassigned, |row| Group::Assigned(row.group))
}

/// Inclusive range containment, first matching row wins
pub fn classify_by_range(value: Option<f64>, table: &RangeTable) -> Group {
    let Some(value) = value.filter(|v| !v.is_nan()) else {
        return Group::Unassigned;
    };

    table
        .rows()
        .iter()
        .find(|row| row.contains(value))
        .map_or(Group::Unassigned, |row| Group::Assigned(row.group))
}

/// Range lookup on a raw text cell
///
/// Unparsable text is unassigned, not an error.
pub fn classify_text_by_range(value: Option<&str>, table: &RangeTable) -> Group {
    classify_by_range(value.and_then(parse_number), table)
}

/// Lenient numeric coercion of a text cell
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Worst-case rating: product of the four groups, only if all are assigned
pub fn worst_case_rating(groups: &[Group]) -> Option<u32> {
    groups
        .iter()
        .try_fold(1u32, |acc, g| acc.checked_mul(g.value()?))
}

/// Minimum batch size (kg) per maximum dose (mg)
///
/// Undefined when either value is missing or the dose is not positive.
pub fn batch_dose_ratio(product: &Product) -> Option<f64> {
    let batch = product.min_batch_size_kg?;
    let dose = product.max_dose_mg?;
    if dose > 0.0 {
        Some(batch / dose).filter(|r| r.is_finite())
    } else {
        None
    }
}

/// Classify one product against all four tables
pub fn classify_product(index: usize, product: &Product, criteria: &RatingCriteria) -> ClassifiedProduct {
    let solubility_group = classify_by_description(product.solubility.as_deref(), &criteria.solubility);
    let dose_group = classify_by_range(product.min_dose_mg, &criteria.dose);
    let toxicity_group = classify_by_range(product.ade_pde_ug_per_day, &criteria.toxicity);
    let cleaning_group = classify_by_description(product.hardest_to_clean.as_deref(), &criteria.cleaning);

    let groups = [solubility_group, dose_group, toxicity_group, cleaning_group];
    let worst_case_rating = worst_case_rating(&groups);

    if worst_case_rating.is_none() {
        if groups.iter().all(|g| g.is_assigned()) {
            tracing::warn!(
                "Product '{}' (row {}) rating {}×{}×{}×{} overflows; excluded from rating",
                product.name, index, solubility_group, dose_group, toxicity_group, cleaning_group
            );
        } else {
            tracing::warn!(
                "Product '{}' (row {}) has unassigned groups [solubility={}, dose={}, toxicity={}, cleaning={}]; excluded from rating",
                product.name, index, solubility_group, dose_group, toxicity_group, cleaning_group
            );
        }
    }

    ClassifiedProduct {
        index,
        product: product.clone(),
        solubility_group,
        dose_group,
        toxicity_group,
        cleaning_group,
        worst_case_rating,
        batch_dose_ratio: batch_dose_ratio(product),
    }
}

/// Classify every product, preserving input order
pub fn classify_products(products: &[Product], criteria: &RatingCriteria) -> Vec<ClassifiedProduct> {
    products
        .iter()
        .enumerate()
        .map(|(idx, product)| classify_product(idx, product, criteria))
        .collect()
}
