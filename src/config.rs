//! Calculation policy
//!
//! Named policy constants: the surface safety margin, the rinse-volume
//! divisor, the 10 ppm factor, the source of the swab sampling area, and
//! the handling of overlapping range rows. Loaded from JSON; any missing
//! field takes its default.

use crate::error::{CarryoverError, CarryoverResult};
use crate::types::ClassifiedProduct;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 20% buffer on the summed product-contact surface
pub const DEFAULT_SURFACE_MARGIN: f64 = 1.2;

/// Rinse limit (mg) / this divisor = rinse volume (L)
pub const DEFAULT_RINSE_VOLUME_DIVISOR: f64 = 10.0;

/// 10 ppm expressed as a mass fraction
pub const DEFAULT_TEN_PPM_FACTOR: f64 = 0.00001;

/// Where the swab sampling area (m²) is taken from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum SwabAreaSource {
    /// Swab surface of the first product row
    #[default]
    FirstProduct,
    /// Swab surface of the named product
    Product(String),
    /// Fixed area in m²
    Fixed(f64),
}

impl SwabAreaSource {
    /// Resolve the swab area against the classified product table
    pub fn resolve(&self, products: &[ClassifiedProduct]) -> CarryoverResult<f64> {
        let (item, area) = match self {
            SwabAreaSource::Fixed(area) => ("fixed swab area".to_string(), Some(*area)),
            SwabAreaSource::FirstProduct => {
                let first = products
                    .first()
                    .ok_or(CarryoverError::EmptyTable { table: "product" })?;
                (first.name().to_string(), first.product.swab_surface_area_m2)
            }
            SwabAreaSource::Product(name) => {
                let product = products
                    .iter()
                    .find(|p| p.name() == name)
                    .ok_or_else(|| CarryoverError::UnknownProduct { name: name.clone() })?;
                (product.name().to_string(), product.product.swab_surface_area_m2)
            }
        };

        let area = area.ok_or_else(|| CarryoverError::MissingValue {
            product: item.clone(),
            field: "swab_surface_area_m2",
        })?;

        if !area.is_finite() || area <= 0.0 {
            return Err(CarryoverError::InvalidValue {
                item,
                field: "swab surface area",
                value: area,
            });
        }

        Ok(area)
    }
}

/// Treatment of range rows that share values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOverlapPolicy {
    /// First matching row wins; overlaps are logged
    #[default]
    FirstMatch,
    /// Overlapping rows fail the run
    Reject,
}

/// Policy parameters for one calculation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationPolicy {
    pub surface_margin: f64,
    pub rinse_volume_divisor: f64,
    pub ten_ppm_factor: f64,
    pub reference_swab_area: SwabAreaSource,
    pub range_overlap: RangeOverlapPolicy,
}

impl Default for CalculationPolicy {
    fn default() -> Self {
        Self {
            surface_margin: DEFAULT_SURFACE_MARGIN,
            rinse_volume_divisor: DEFAULT_RINSE_VOLUME_DIVISOR,
            ten_ppm_factor: DEFAULT_TEN_PPM_FACTOR,
            reference_swab_area: SwabAreaSource::default(),
            range_overlap: RangeOverlapPolicy::default(),
        }
    }
}

impl CalculationPolicy {
    /// Load policy from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {:?}", path))?;

        let policy: CalculationPolicy = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse policy JSON: {:?}", path))?;

        policy
            .validate()
            .with_context(|| format!("Rejected policy file: {:?}", path))?;

        Ok(policy)
    }

    /// Reject values that would make the limits meaningless
    pub fn validate(&self) -> CarryoverResult<()> {
        // A margin below 1 would shrink the surface and loosen every limit
        if !self.surface_margin.is_finite() || self.surface_margin < 1.0 {
            return Err(CarryoverError::InvalidPolicy {
                name: "surface_margin",
                value: self.surface_margin,
            });
        }
        if !self.rinse_volume_divisor.is_finite() || self.rinse_volume_divisor <= 0.0 {
            return Err(CarryoverError::InvalidPolicy {
                name: "rinse_volume_divisor",
                value: self.rinse_volume_divisor,
            });
        }
        if !self.ten_ppm_factor.is_finite() || self.ten_ppm_factor <= 0.0 {
            return Err(CarryoverError::InvalidPolicy {
                name: "ten_ppm_factor",
                value: self.ten_ppm_factor,
            });
        }
        if let SwabAreaSource::Fixed(area) = self.reference_swab_area {
            if !area.is_finite() || area <= 0.0 {
                return Err(CarryoverError::InvalidPolicy {
                    name: "reference_swab_area",
                    value: area,
                });
            }
        }
        Ok(())
    }
}
