//! Carryover Calculator - main coordinator for one calculation run
//!
//! Runs the stages strictly forward over one input bundle:
//! 1. Classify products against the rating criteria
//! 2. Select previous/next worst-case products
//! 3. Compute MACO candidates and take the lowest
//! 4. Propagate the lowest MACO into swab and per-equipment rinse limits
//!
//! The calculator holds only its policy; every run is independent and
//! either returns a complete `CleaningLimits` or fails with the reason.

use crate::config::CalculationPolicy;
use crate::data::InputBundle;
use crate::error::{positive_denominator, CarryoverError, CarryoverResult};
use crate::grouping::classify_products;
use crate::limits::{compute_maco, rinse_limit_per_equipment, swab_limit, total_surface_area, total_surface_with_margin};
use crate::selection::{select_worst_cases, WorstCasePair};
use crate::types::{ClassifiedProduct, MacoResult, Product, RinseLimitRow, SwabLimit};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Complete result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningLimits {
    /// Enriched product table, input order
    pub products: Vec<ClassifiedProduct>,
    pub worst_cases: WorstCasePair,
    pub maco: MacoResult,
    pub swab: SwabLimit,
    /// One row per equipment item, equipment order
    pub rinse: Vec<RinseLimitRow>,
    pub policy: CalculationPolicy,
}

impl CleaningLimits {
    /// Products excluded from rating because a group is unassigned
    pub fn unrated_products(&self) -> impl Iterator<Item = &ClassifiedProduct> {
        self.products.iter().filter(|p| p.worst_case_rating.is_none())
    }
}

/// Fail on any product whose maximum dose is missing or not positive
fn check_max_doses(products: &[Product]) -> CarryoverResult<()> {
    for product in products {
        let max_dose = product.max_dose_mg.ok_or_else(|| CarryoverError::MissingValue {
            product: product.name.clone(),
            field: "max_dose_mg",
        })?;
        positive_denominator(format!("maximum dose of '{}'", product.name), max_dose)?;
    }
    Ok(())
}

/// Main carryover calculator
#[derive(Debug, Clone, Default)]
pub struct CarryoverCalculator {
    policy: CalculationPolicy,
}

impl CarryoverCalculator {
    /// Create a calculator; rejects an invalid policy up front
    pub fn new(policy: CalculationPolicy) -> CarryoverResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &CalculationPolicy {
        &self.policy
    }

    /// Run the full pipeline over one input bundle
    pub fn run(&self, input: &InputBundle) -> CarryoverResult<CleaningLimits> {
        let start = Instant::now();

        if input.products.is_empty() {
            return Err(CarryoverError::EmptyTable { table: "product" });
        }
        if input.equipment.is_empty() {
            return Err(CarryoverError::EmptyTable { table: "equipment" });
        }
        input.criteria.check_overlaps(self.policy.range_overlap)?;
        check_max_doses(&input.products)?;

        // Stage 1: classification
        let products = classify_products(&input.products, &input.criteria);
        let rated = products.iter().filter(|p| p.worst_case_rating.is_some()).count();
        tracing::info!("Classified {} products ({} fully rated)", products.len(), rated);

        // Stage 2: worst-case selection
        let worst_cases = select_worst_cases(&products)?;

        // Stage 3: MACO
        let maco = compute_maco(&worst_cases.previous.product, &worst_cases.next.product, &self.policy)?;

        // Stage 4: swab and rinse limits
        let total_area = total_surface_area(&input.equipment)?;
        let with_margin = total_surface_with_margin(&input.equipment, self.policy.surface_margin)?;
        let swab_area = self.policy.reference_swab_area.resolve(&products)?;
        let swab = SwabLimit {
            swab_surface_area_m2: swab_area,
            total_surface_area_m2: total_area,
            total_surface_with_margin_m2: with_margin,
            limit_mg: swab_limit(maco.minimum_mg, swab_area, with_margin)?,
        };
        let rinse = rinse_limit_per_equipment(
            maco.minimum_mg,
            &input.equipment,
            with_margin,
            self.policy.rinse_volume_divisor,
        )?;

        tracing::info!(
            "Limits: swab={:.6} mg over {:.4} m², {} rinse rows, total surface {:.3} m² (×{} = {:.3} m²) in {:.1} ms",
            swab.limit_mg,
            swab_area,
            rinse.len(),
            total_area,
            self.policy.surface_margin,
            with_margin,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(CleaningLimits {
            products,
            worst_cases,
            maco,
            swab,
            rinse,
            policy: self.policy.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RangeOverlapPolicy, SwabAreaSource};
    use crate::grouping::{DescriptionRow, DescriptionTable, RangeRow, RangeTable, RatingCriteria};
    use crate::types::{EquipmentItem, Group};
    use approx::assert_relative_eq;

    fn criteria() -> RatingCriteria {
        RatingCriteria {
            solubility: DescriptionTable::new(
                "Solubility",
                vec![
                    DescriptionRow { description: "Freely Soluble".to_string(), group: 1 },
                    DescriptionRow { description: "Soluble".to_string(), group: 2 },
                ],
            )
            .unwrap(),
            dose: RangeTable::new(
                "Dose",
                vec![
                    RangeRow { min: 0.0, max: 9.99, group: 3 },
                    RangeRow { min: 10.0, max: 99.99, group: 2 },
                    RangeRow { min: 100.0, max: 10000.0, group: 1 },
                ],
            )
            .unwrap(),
            toxicity: RangeTable::new(
                "Toxicity",
                vec![
                    RangeRow { min: 100.0, max: 100000.0, group: 1 },
                    RangeRow { min: 0.0, max: 99.99, group: 2 },
                ],
            )
            .unwrap(),
            cleaning: DescriptionTable::new(
                "Cleaning",
                vec![
                    DescriptionRow { description: "Easy".to_string(), group: 1 },
                    DescriptionRow { description: "Difficult".to_string(), group: 3 },
                ],
            )
            .unwrap(),
        }
    }

    fn scenario_product() -> Product {
        Product {
            name: "Scenario".to_string(),
            solubility: Some("Freely Soluble".to_string()),
            min_dose_mg: Some(10.0),
            max_dose_mg: Some(50.0),
            ade_pde_ug_per_day: Some(100.0),
            hardest_to_clean: Some("Easy".to_string()),
            min_batch_size_kg: Some(100.0),
            swab_surface_area_m2: Some(0.01),
            ..Default::default()
        }
    }

    fn equipment(areas: &[f64]) -> Vec<EquipmentItem> {
        areas
            .iter()
            .enumerate()
            .map(|(i, &area)| EquipmentItem {
                name: format!("Item {}", i + 1),
                id: format!("EQ-{:02}", i + 1),
                surface_area_m2: area,
                usage: None,
                cleaning_procedure: None,
            })
            .collect()
    }

    #[test]
    fn test_single_product_scenario() {
        let input = InputBundle {
            products: vec![scenario_product()],
            equipment: equipment(&[2.0, 3.0]),
            criteria: criteria(),
        };

        let limits = CarryoverCalculator::default().run(&input).unwrap();
        let product = &limits.products[0];

        assert_eq!(
            product.groups(),
            [Group::Assigned(1), Group::Assigned(2), Group::Assigned(1), Group::Assigned(1)]
        );
        assert_eq!(product.worst_case_rating, Some(2));
        assert_relative_eq!(product.batch_dose_ratio.unwrap(), 2.0, epsilon = 1e-12);

        assert_relative_eq!(limits.maco.ten_ppm_mg, 20.0, epsilon = 1e-9);
        assert_relative_eq!(limits.swab.total_surface_with_margin_m2, 6.0, epsilon = 1e-12);
        assert_relative_eq!(
            limits.swab.limit_mg,
            limits.maco.minimum_mg * 0.01 / 6.0,
            epsilon = 1e-12
        );
        assert_eq!(limits.rinse.len(), 2);
    }

    #[test]
    fn test_empty_tables_fail() {
        let calc = CarryoverCalculator::default();

        let input = InputBundle { products: vec![], equipment: equipment(&[1.0]), criteria: criteria() };
        assert_eq!(calc.run(&input), Err(CarryoverError::EmptyTable { table: "product" }));

        let input = InputBundle { products: vec![scenario_product()], equipment: vec![], criteria: criteria() };
        assert_eq!(calc.run(&input), Err(CarryoverError::EmptyTable { table: "equipment" }));
    }

    #[test]
    fn test_no_rated_product_fails() {
        let mut product = scenario_product();
        product.solubility = Some("Unknown".to_string());
        let input = InputBundle {
            products: vec![product],
            equipment: equipment(&[1.0]),
            criteria: criteria(),
        };

        assert!(matches!(
            CarryoverCalculator::default().run(&input),
            Err(CarryoverError::NoRankableProduct { .. })
        ));
    }

    #[test]
    fn test_zero_surface_fails() {
        let input = InputBundle {
            products: vec![scenario_product()],
            equipment: equipment(&[0.0, 0.0]),
            criteria: criteria(),
        };
        assert!(matches!(
            CarryoverCalculator::default().run(&input),
            Err(CarryoverError::NonPositiveDenominator { .. })
        ));
    }

    #[test]
    fn test_overlap_policy_applies() {
        let mut criteria = criteria();
        criteria.dose = RangeTable::new(
            "Dose",
            vec![
                RangeRow { min: 0.0, max: 10.0, group: 3 },
                RangeRow { min: 10.0, max: 10000.0, group: 2 },
            ],
        )
        .unwrap();
        let input = InputBundle {
            products: vec![scenario_product()],
            equipment: equipment(&[2.0, 3.0]),
            criteria,
        };

        // First match: 10 mg lands in the first row
        let limits = CarryoverCalculator::default().run(&input).unwrap();
        assert_eq!(limits.products[0].dose_group, Group::Assigned(3));

        let strict = CarryoverCalculator::new(CalculationPolicy {
            range_overlap: RangeOverlapPolicy::Reject,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(strict.run(&input), Err(CarryoverError::OverlappingRanges { .. })));
    }

    #[test]
    fn test_fixed_swab_area_policy() {
        let input = InputBundle {
            products: vec![scenario_product()],
            equipment: equipment(&[2.0, 3.0]),
            criteria: criteria(),
        };
        let calc = CarryoverCalculator::new(CalculationPolicy {
            reference_swab_area: SwabAreaSource::Fixed(0.0025),
            ..Default::default()
        })
        .unwrap();

        let limits = calc.run(&input).unwrap();
        assert_eq!(limits.swab.swab_surface_area_m2, 0.0025);
        assert_relative_eq!(limits.swab.limit_mg, 20.0 * 0.0025 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_max_dose_fails_run() {
        let mut other = scenario_product();
        other.name = "Other".to_string();

        for dose in [0.0, -5.0, f64::NAN] {
            other.max_dose_mg = Some(dose);
            let input = InputBundle {
                products: vec![scenario_product(), other.clone()],
                equipment: equipment(&[2.0, 3.0]),
                criteria: criteria(),
            };
            assert!(matches!(
                CarryoverCalculator::default().run(&input),
                Err(CarryoverError::NonPositiveDenominator { .. })
            ));
        }

        other.max_dose_mg = None;
        let input = InputBundle {
            products: vec![scenario_product(), other],
            equipment: equipment(&[2.0, 3.0]),
            criteria: criteria(),
        };
        assert_eq!(
            CarryoverCalculator::default().run(&input),
            Err(CarryoverError::MissingValue { product: "Other".to_string(), field: "max_dose_mg" })
        );
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let policy = CalculationPolicy { surface_margin: 0.5, ..Default::default() };
        assert!(CarryoverCalculator::new(policy).is_err());
    }
}
