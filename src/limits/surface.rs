//! Surface-area limit propagation
//!
//! Spreads the lowest MACO over the total product-contact surface (with
//! safety margin) to get the swab limit for one sampled area and the rinse
//! limit/volume for each equipment item.

use crate::error::{positive_denominator, CarryoverError, CarryoverResult};
use crate::types::{EquipmentItem, RinseLimitRow};

/// mL per L
const ML_PER_L: f64 = 1000.0;

/// Sum of all product-contact surface areas (m²)
pub fn total_surface_area(equipment: &[EquipmentItem]) -> CarryoverResult<f64> {
    if equipment.is_empty() {
        return Err(CarryoverError::EmptyTable { table: "equipment" });
    }

    let mut total = 0.0;
    for item in equipment {
        if !item.surface_area_m2.is_finite() || item.surface_area_m2 < 0.0 {
            return Err(CarryoverError::InvalidValue {
                item: format!("{} ({})", item.name, item.id),
                field: "surface area",
                value: item.surface_area_m2,
            });
        }
        total += item.surface_area_m2;
    }

    Ok(total)
}

/// Total surface area multiplied by the safety margin
///
/// Fails when the result is not a usable (positive) denominator.
pub fn total_surface_with_margin(equipment: &[EquipmentItem], margin: f64) -> CarryoverResult<f64> {
    let total = total_surface_area(equipment)?;
    positive_denominator("total surface area with margin", total * margin)
}

/// Swab limit (mg) for the sampled area
pub fn swab_limit(min_maco: f64, swab_surface_area: f64, total_surface_with_margin: f64) -> CarryoverResult<f64> {
    let denominator = positive_denominator("total surface area with margin", total_surface_with_margin)?;
    Ok(min_maco * swab_surface_area / denominator)
}

/// Rinse limit and volume per equipment item, in equipment order
pub fn rinse_limit_per_equipment(
    min_maco: f64,
    equipment: &[EquipmentItem],
    total_surface_with_margin: f64,
    rinse_volume_divisor: f64,
) -> CarryoverResult<Vec<RinseLimitRow>> {
    let denominator = positive_denominator("total surface area with margin", total_surface_with_margin)?;
    let divisor = positive_denominator("rinse volume divisor", rinse_volume_divisor)?;

    let rows = equipment
        .iter()
        .map(|item| {
            let rinse_limit_mg = min_maco * item.surface_area_m2 / denominator;
            let rinse_volume_l = rinse_limit_mg / divisor;

            tracing::debug!(
                "Rinse {} ({}): {:.3} m² → {:.6} mg, {:.6} L",
                item.name, item.id, item.surface_area_m2, rinse_limit_mg, rinse_volume_l
            );

            RinseLimitRow {
                equipment_name: item.name.clone(),
                equipment_id: item.id.clone(),
                surface_area_m2: item.surface_area_m2,
                rinse_limit_mg,
                rinse_volume_l,
                rinse_volume_ml: rinse_volume_l * ML_PER_L,
            }
        })
        .collect();

    Ok(rows)
}
