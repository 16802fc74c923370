//! Report views over a finished calculation
//!
//! The core keeps full precision; rounding for display happens here
//! (rinse limit and volume in L to 6 places, volume in mL to 2 places).
//! Views mirror the calculation screens: MACO, swab limit, rinse limit,
//! rinse volume, and the worst-case selection.

pub mod formatters;

pub use formatters::{JsonFormatter, MarkdownFormatter};

use crate::pipeline::CleaningLimits;
use crate::types::{ClassifiedProduct, Group, Product};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Decimal places for rinse limit (mg) and rinse volume (L)
pub const RINSE_DECIMALS: i32 = 6;

/// Decimal places for rinse volume (mL)
pub const RINSE_ML_DECIMALS: i32 = 2;

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Which part of the report to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportView {
    All,
    Maco,
    Swab,
    Rinse,
    RinseVolume,
    WorstCase,
}

impl FromStr for ReportView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ReportView::All),
            "maco" => Ok(ReportView::Maco),
            "swab" => Ok(ReportView::Swab),
            "rinse" => Ok(ReportView::Rinse),
            "rinse-volume" | "rinsevol" => Ok(ReportView::RinseVolume),
            "worst-case" | "worstcase" => Ok(ReportView::WorstCase),
            other => Err(format!(
                "unknown report view '{}' (expected all, maco, swab, rinse, rinse-volume, worst-case)",
                other
            )),
        }
    }
}

/// One line of the enriched product table: every input column plus
/// the four groups, rating, and batch/dose ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    pub solubility_group: Group,
    pub dose_group: Group,
    pub toxicity_group: Group,
    pub cleaning_group: Group,
    pub worst_case_rating: Option<u32>,
    pub batch_dose_ratio: Option<f64>,
}

impl ProductRow {
    pub fn name(&self) -> &str {
        &self.product.name
    }
}

impl From<&ClassifiedProduct> for ProductRow {
    fn from(p: &ClassifiedProduct) -> Self {
        ProductRow {
            product: p.product.clone(),
            solubility_group: p.solubility_group,
            dose_group: p.dose_group,
            toxicity_group: p.toxicity_group,
            cleaning_group: p.cleaning_group,
            worst_case_rating: p.worst_case_rating,
            batch_dose_ratio: p.batch_dose_ratio,
        }
    }
}

/// MACO candidates and the value used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacoSummary {
    pub ten_ppm_mg: f64,
    pub tdd_mg: f64,
    pub ade_pde_mg: f64,
    pub lowest_mg: f64,
    pub limiting_method: String,
}

/// Swab limit with the surfaces it used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwabSummary {
    pub swab_surface_area_m2: f64,
    pub total_surface_area_m2: f64,
    pub total_surface_with_margin_m2: f64,
    pub surface_margin: f64,
    pub swab_limit_mg: f64,
}

/// Rounded rinse row for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RinseRow {
    pub equipment_name: String,
    pub equipment_id: String,
    pub surface_area_m2: f64,
    pub rinse_limit_mg: f64,
    pub rinse_volume_l: f64,
    pub rinse_volume_ml: f64,
}

/// Worst-case selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstCaseSummary {
    /// Highest worst-case rating
    pub previous: ProductRow,
    /// Lowest minimum batch / maximum dose ratio
    pub next: ProductRow,
}

/// Display-ready report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub products: Vec<ProductRow>,
    pub maco: MacoSummary,
    pub swab: SwabSummary,
    pub rinse: Vec<RinseRow>,
    pub worst_cases: WorstCaseSummary,
    /// Products left out of the rating because a group is unassigned
    pub unrated_products: Vec<String>,
}

impl CleaningReport {
    pub fn from_limits(limits: &CleaningLimits) -> Self {
        let rinse = limits
            .rinse
            .iter()
            .map(|row| RinseRow {
                equipment_name: row.equipment_name.clone(),
                equipment_id: row.equipment_id.clone(),
                surface_area_m2: row.surface_area_m2,
                rinse_limit_mg: round_to(row.rinse_limit_mg, RINSE_DECIMALS),
                rinse_volume_l: round_to(row.rinse_volume_l, RINSE_DECIMALS),
                rinse_volume_ml: round_to(row.rinse_volume_ml, RINSE_ML_DECIMALS),
            })
            .collect();

        CleaningReport {
            products: limits.products.iter().map(ProductRow::from).collect(),
            maco: MacoSummary {
                ten_ppm_mg: limits.maco.ten_ppm_mg,
                tdd_mg: limits.maco.tdd_mg,
                ade_pde_mg: limits.maco.ade_pde_mg,
                lowest_mg: limits.maco.minimum_mg,
                limiting_method: limits.maco.limiting_method.label().to_string(),
            },
            swab: SwabSummary {
                swab_surface_area_m2: limits.swab.swab_surface_area_m2,
                total_surface_area_m2: limits.swab.total_surface_area_m2,
                total_surface_with_margin_m2: limits.swab.total_surface_with_margin_m2,
                surface_margin: limits.policy.surface_margin,
                swab_limit_mg: limits.swab.limit_mg,
            },
            rinse,
            worst_cases: WorstCaseSummary {
                previous: ProductRow::from(&limits.worst_cases.previous),
                next: ProductRow::from(&limits.worst_cases.next),
            },
            unrated_products: limits.unrated_products().map(|p| p.name().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(1.23456789, 6), 1.234568, epsilon = 1e-12);
        assert_relative_eq!(round_to(156.255, 2), 156.26, epsilon = 1e-9);
        assert_relative_eq!(round_to(-0.0000004, 6), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!("maco".parse::<ReportView>().unwrap(), ReportView::Maco);
        assert_eq!(" Rinse-Volume ".parse::<ReportView>().unwrap(), ReportView::RinseVolume);
        assert_eq!("rinsevol".parse::<ReportView>().unwrap(), ReportView::RinseVolume);
        assert_eq!("worst-case".parse::<ReportView>().unwrap(), ReportView::WorstCase);
        assert!("summary".parse::<ReportView>().is_err());
    }
}
