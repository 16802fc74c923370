//! MAXIMUM ALLOWABLE CARRYOVER (MACO)
//!
//! Three candidates from the worst-case pair, all scaled by the next
//! product's minimum batch (kg → mg) over its maximum daily dose (mg):
//!
//! | Method  | Safety factor                           |
//! |---------|-----------------------------------------|
//! | 10 ppm  | 0.00001                                  |
//! | TDD     | previous min dose (mg) / 1000            |
//! | ADE/PDE | previous ADE/PDE (µg/day → mg/day)       |
//!
//! The smallest candidate is the one carried downstream.

use crate::config::CalculationPolicy;
use crate::error::{positive_denominator, CarryoverError, CarryoverResult};
use crate::types::{MacoMethod, MacoResult, Product};

/// Batch size kg → mg
pub const KG_TO_MG: f64 = 1e6;

/// ADE/PDE µg → mg
pub const UG_PER_MG: f64 = 1000.0;

/// TDD method divides the previous product's dose by this factor
pub const TDD_SAFETY_FACTOR: f64 = 1000.0;

/// Pull a required, finite, non-negative value from a product
fn required(product: &Product, field: &'static str, value: Option<f64>) -> CarryoverResult<f64> {
    let value = value.ok_or_else(|| CarryoverError::MissingValue {
        product: product.name.clone(),
        field,
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(CarryoverError::InvalidValue {
            item: product.name.clone(),
            field,
            value,
        });
    }

    Ok(value)
}

/// Compute the three MACO candidates and their minimum
///
/// # Errors
/// - `NonPositiveDenominator` when the next product's maximum dose is
///   zero, negative, or not finite
/// - `MissingValue` / `InvalidValue` when a formula input is absent or
///   negative
pub fn compute_maco(
    previous: &Product,
    next: &Product,
    policy: &CalculationPolicy,
) -> CarryoverResult<MacoResult> {
    let max_dose_next_mg = next.max_dose_mg.ok_or_else(|| CarryoverError::MissingValue {
        product: next.name.clone(),
        field: "max_dose_mg",
    })?;
    let max_dose_next_mg =
        positive_denominator(format!("maximum dose of '{}'", next.name), max_dose_next_mg)?;

    let min_batch_next_kg = required(next, "min_batch_size_kg", next.min_batch_size_kg)?;
    let min_dose_prev_mg = required(previous, "min_dose_mg", previous.min_dose_mg)?;
    let ade_prev_ug = required(previous, "ade_pde_ug_per_day", previous.ade_pde_ug_per_day)?;
    let ade_prev_mg = ade_prev_ug / UG_PER_MG;

    // Common scale: mg of next product per maximum daily dose
    let batch_per_dose = min_batch_next_kg * KG_TO_MG / max_dose_next_mg;

    let ten_ppm_mg = policy.ten_ppm_factor * batch_per_dose;
    let tdd_mg = min_dose_prev_mg * min_batch_next_kg * KG_TO_MG / (max_dose_next_mg * TDD_SAFETY_FACTOR);
    let ade_pde_mg = ade_prev_mg * batch_per_dose;

    // Strictly smaller replaces, so the earlier method keeps ties
    let mut lowest = (MacoMethod::TenPpm, ten_ppm_mg);
    for candidate in [(MacoMethod::TherapeuticDailyDose, tdd_mg), (MacoMethod::AdePde, ade_pde_mg)] {
        if candidate.1 < lowest.1 {
            lowest = candidate;
        }
    }
    let (limiting_method, minimum_mg) = lowest;

    tracing::info!(
        "MACO (mg): 10ppm={:.6}, TDD={:.6}, ADE={:.6} → lowest={:.6} ({})",
        ten_ppm_mg,
        tdd_mg,
        ade_pde_mg,
        minimum_mg,
        limiting_method.label()
    );

    Ok(MacoResult {
        ten_ppm_mg,
        tdd_mg,
        ade_pde_mg,
        minimum_mg,
        limiting_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn product(name: &str, min_dose: f64, max_dose: f64, ade: f64, min_batch: f64) -> Product {
        Product {
            name: name.to_string(),
            min_dose_mg: Some(min_dose),
            max_dose_mg: Some(max_dose),
            ade_pde_ug_per_day: Some(ade),
            min_batch_size_kg: Some(min_batch),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_product_scenario() {
        // Min dose 10 mg, max dose 50 mg, ADE 100 µg/day, batch 100 kg
        let p = product("A", 10.0, 50.0, 100.0, 100.0);
        let maco = compute_maco(&p, &p, &CalculationPolicy::default()).unwrap();

        // 0.00001 × 100 × 1e6 / 50
        assert_relative_eq!(maco.ten_ppm_mg, 20.0, epsilon = 1e-9);
        // 10 × 100 × 1e6 / (50 × 1000)
        assert_relative_eq!(maco.tdd_mg, 20000.0, epsilon = 1e-9);
        // 0.1 × 100 × 1e6 / 50
        assert_relative_eq!(maco.ade_pde_mg, 200000.0, epsilon = 1e-9);

        assert_relative_eq!(maco.minimum_mg, 20.0, epsilon = 1e-9);
        assert_eq!(maco.limiting_method, MacoMethod::TenPpm);
    }

    #[test]
    fn test_minimum_never_exceeds_candidates() {
        let previous = product("Prev", 0.5, 2.0, 1.0, 50.0);
        let next = product("Next", 5.0, 400.0, 500.0, 120.0);
        let maco = compute_maco(&previous, &next, &CalculationPolicy::default()).unwrap();

        for (_, value) in maco.candidates() {
            assert!(maco.minimum_mg <= value);
        }
        // ADE 1 µg → 0.001 mg is the tightest factor here
        assert_eq!(maco.limiting_method, MacoMethod::AdePde);
        assert_relative_eq!(maco.ade_pde_mg, 0.001 * 120.0 * 1e6 / 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tie_goes_to_earlier_method() {
        // 10 ppm factor 0.5 equals TDD factor 500 / 1000
        let policy = CalculationPolicy { ten_ppm_factor: 0.5, ..Default::default() };
        let previous = product("Prev", 500.0, 1000.0, 1e9, 1.0);
        let next = product("Next", 1.0, 1.0, 1e9, 1.0);
        let maco = compute_maco(&previous, &next, &policy).unwrap();
        assert_eq!(maco.ten_ppm_mg, maco.tdd_mg);
        assert_eq!(maco.limiting_method, MacoMethod::TenPpm);
    }

    #[test]
    fn test_tdd_ade_tie_goes_to_tdd() {
        // TDD factor 1000 / 1000 equals ADE factor 1000 µg → 1 mg
        let previous = product("Prev", 1000.0, 2000.0, 1000.0, 1.0);
        let next = product("Next", 1.0, 1.0, 1.0, 1.0);
        let maco = compute_maco(&previous, &next, &CalculationPolicy::default()).unwrap();
        assert_eq!(maco.tdd_mg, maco.ade_pde_mg);
        assert!(maco.ten_ppm_mg < maco.tdd_mg);

        let policy = CalculationPolicy { ten_ppm_factor: 2.0, ..Default::default() };
        let maco = compute_maco(&previous, &next, &policy).unwrap();
        assert_eq!(maco.limiting_method, MacoMethod::TherapeuticDailyDose);
    }

    #[test]
    fn test_zero_max_dose_is_rejected() {
        let previous = product("Prev", 10.0, 50.0, 100.0, 100.0);
        let next = product("Next", 10.0, 0.0, 100.0, 100.0);
        let err = compute_maco(&previous, &next, &CalculationPolicy::default()).unwrap_err();
        assert!(matches!(err, CarryoverError::NonPositiveDenominator { .. }));

        let next = product("Next", 10.0, -5.0, 100.0, 100.0);
        assert!(compute_maco(&previous, &next, &CalculationPolicy::default()).is_err());
    }

    #[test]
    fn test_missing_inputs_are_named() {
        let mut previous = product("Prev", 10.0, 50.0, 100.0, 100.0);
        previous.ade_pde_ug_per_day = None;
        let next = product("Next", 10.0, 50.0, 100.0, 100.0);

        let err = compute_maco(&previous, &next, &CalculationPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            CarryoverError::MissingValue {
                product: "Prev".to_string(),
                field: "ade_pde_ug_per_day",
            }
        );
    }

    #[test]
    fn test_ten_ppm_factor_comes_from_policy() {
        let p = product("A", 10.0, 50.0, 100.0, 100.0);
        let policy = CalculationPolicy { ten_ppm_factor: 0.000001, ..Default::default() };
        let maco = compute_maco(&p, &p, &policy).unwrap();
        assert_relative_eq!(maco.ten_ppm_mg, 2.0, epsilon = 1e-9);
    }
}
