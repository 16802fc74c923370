//! Core data model
//!
//! Products and equipment come in from the input tables; everything else
//! is derived once per run and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Risk group assigned by a lookup table
///
/// Serializes as the bare group number, or `null` when unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Group {
    Assigned(u32),
    Unassigned,
}

impl Group {
    pub fn value(self) -> Option<u32> {
        match self {
            Group::Assigned(g) => Some(g),
            Group::Unassigned => None,
        }
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, Group::Assigned(_))
    }
}

impl From<Option<u32>> for Group {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Group::Unassigned, Group::Assigned)
    }
}

impl From<Group> for Option<u32> {
    fn from(group: Group) -> Self {
        group.value()
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Assigned(g) => write!(f, "{}", g),
            Group::Unassigned => write!(f, "-"),
        }
    }
}

/// One row of the product table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub name: String,
    /// Free-text solubility descriptor ("Freely Soluble", ...)
    pub solubility: Option<String>,
    pub min_dose_mg: Option<f64>,
    pub max_dose_mg: Option<f64>,
    /// ADE/PDE in µg/day
    pub ade_pde_ug_per_day: Option<f64>,
    /// Free-text cleaning difficulty descriptor
    pub hardest_to_clean: Option<String>,
    pub min_batch_size_kg: Option<f64>,
    pub max_batch_size_kg: Option<f64>,
    pub swab_recovery_pct: Option<f64>,
    pub lod_ppm: Option<f64>,
    pub loq_ppm: Option<f64>,
    pub swab_dilution_ml: Option<f64>,
    pub swab_surface_area_m2: Option<f64>,
}

/// One row of the equipment table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub name: String,
    pub id: String,
    /// Product-contact surface area (m²)
    pub surface_area_m2: f64,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub cleaning_procedure: Option<String>,
}

/// Product enriched with its four risk groups and the two ranking keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedProduct {
    /// Position in the input product table
    pub index: usize,
    pub product: Product,
    pub solubility_group: Group,
    pub dose_group: Group,
    pub toxicity_group: Group,
    pub cleaning_group: Group,
    /// Product of the four groups; `None` unless all four are assigned
    pub worst_case_rating: Option<u32>,
    /// Minimum batch size (kg) / maximum dose (mg); `None` when undefined
    pub batch_dose_ratio: Option<f64>,
}

impl ClassifiedProduct {
    pub fn groups(&self) -> [Group; 4] {
        [
            self.solubility_group,
            self.dose_group,
            self.toxicity_group,
            self.cleaning_group,
        ]
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }
}

/// MACO calculation basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacoMethod {
    TenPpm,
    TherapeuticDailyDose,
    AdePde,
}

impl MacoMethod {
    pub fn label(self) -> &'static str {
        match self {
            MacoMethod::TenPpm => "10 ppm",
            MacoMethod::TherapeuticDailyDose => "TDD",
            MacoMethod::AdePde => "ADE/PDE",
        }
    }
}

/// The three MACO candidates (mg) and the one carried downstream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacoResult {
    pub ten_ppm_mg: f64,
    pub tdd_mg: f64,
    pub ade_pde_mg: f64,
    pub minimum_mg: f64,
    /// Method that produced the minimum (earliest listed wins ties)
    pub limiting_method: MacoMethod,
}

impl MacoResult {
    pub fn candidates(&self) -> [(MacoMethod, f64); 3] {
        [
            (MacoMethod::TenPpm, self.ten_ppm_mg),
            (MacoMethod::TherapeuticDailyDose, self.tdd_mg),
            (MacoMethod::AdePde, self.ade_pde_mg),
        ]
    }
}

/// Swab limit with the surface figures it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwabLimit {
    pub swab_surface_area_m2: f64,
    pub total_surface_area_m2: f64,
    pub total_surface_with_margin_m2: f64,
    pub limit_mg: f64,
}

/// Rinse limit and volume for one equipment item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RinseLimitRow {
    pub equipment_name: String,
    pub equipment_id: String,
    pub surface_area_m2: f64,
    pub rinse_limit_mg: f64,
    pub rinse_volume_l: f64,
    pub rinse_volume_ml: f64,
}
