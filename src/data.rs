//! Input Loading
//!
//! Reads the product, equipment, and rating criteria tables from CSV
//! using Polars. The rating criteria workbook has four sheets; each sheet
//! is one CSV file here:
//!
//! | File             | Columns                                    |
//! |------------------|--------------------------------------------|
//! | `products.csv`   | see `product_columns`                      |
//! | `equipment.csv`  | see `equipment_columns`                    |
//! | `solubility.csv` | `Description`, `Group`                     |
//! | `dose.csv`       | `Min`, `Max`, `Group`                      |
//! | `toxicity.csv`   | `Min`, `Max`, `Group`                      |
//! | `cleaning.csv`   | `Description`, `Group`                     |
//!
//! Headers match the original workbook exports. Numeric cells are read
//! leniently: anything that does not parse is treated as absent.

use crate::grouping::{DescriptionRow, DescriptionTable, RangeRow, RangeTable, RatingCriteria};
use crate::types::{EquipmentItem, Product};
use crate::utils::{f64_values, materialize_with_columns, string_values};
use anyhow::{anyhow, bail, Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Product table headers
pub mod product_columns {
    pub const NAME: &str = "Product";
    pub const SOLUBILITY: &str = "Solubility";
    pub const MIN_DOSE: &str = "Min Dose (mg)";
    pub const MAX_DOSE: &str = "Max Dose (mg)";
    pub const ADE_PDE: &str = "ADE/PDE (µg/day)";
    pub const HARDEST_TO_CLEAN: &str = "Hardest To Clean";
    pub const MIN_BATCH: &str = "Min Batch Size (kg)";
    pub const MAX_BATCH: &str = "Max Batch Size (kg)";
    pub const SWAB_RECOVERY: &str = "Swab Recovery (%)";
    pub const LOD: &str = "LOD (ppm)";
    pub const LOQ: &str = "LOQ (ppm)";
    pub const SWAB_DILUTION: &str = "Swab Dilution (mL)";
    pub const SWAB_SURFACE: &str = "Swab Surface in M. Sq.";

    pub const ALL: [&str; 13] = [
        NAME, SOLUBILITY, MIN_DOSE, MAX_DOSE, ADE_PDE, HARDEST_TO_CLEAN,
        MIN_BATCH, MAX_BATCH, SWAB_RECOVERY, LOD, LOQ, SWAB_DILUTION, SWAB_SURFACE,
    ];
}

/// Equipment table headers
pub mod equipment_columns {
    pub const NAME: &str = "Eq. Name";
    pub const ID: &str = "Eq. ID";
    pub const SURFACE: &str = "Product contact Surface Area (m2)";
    pub const USAGE: &str = "Usage";
    pub const CLEANING_PROCEDURE: &str = "Cleaning Procedure";

    pub const ALL: [&str; 5] = [NAME, ID, SURFACE, USAGE, CLEANING_PROCEDURE];
}

/// Everything one calculation run consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputBundle {
    pub products: Vec<Product>,
    pub equipment: Vec<EquipmentItem>,
    pub criteria: RatingCriteria,
}

impl InputBundle {
    /// Load all six CSV tables from a directory
    pub fn load(dir: &Path) -> Result<Self> {
        tracing::info!("Loading input tables from {:?}", dir);

        let products = load_products(&dir.join("products.csv"))?;
        let equipment = load_equipment(&dir.join("equipment.csv"))?;
        let criteria = RatingCriteria {
            solubility: load_description_table(&dir.join("solubility.csv"), "Solubility")?,
            dose: load_range_table(&dir.join("dose.csv"), "Dose")?,
            toxicity: load_range_table(&dir.join("toxicity.csv"), "Toxicity")?,
            cleaning: load_description_table(&dir.join("cleaning.csv"), "Cleaning")?,
        };

        tracing::info!("  Products: {}", products.len());
        tracing::info!("  Equipment: {}", equipment.len());
        tracing::info!(
            "  Criteria rows: solubility={}, dose={}, toxicity={}, cleaning={}",
            criteria.solubility.rows().len(),
            criteria.dose.rows().len(),
            criteria.toxicity.rows().len(),
            criteria.cleaning.rows().len()
        );

        Ok(InputBundle { products, equipment, criteria })
    }

    /// Load a bundle already serialized as JSON
    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input bundle: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse input bundle JSON: {:?}", path))
    }
}

/// Read a CSV file with header row, treating "NA" and blanks as null
fn read_csv(path: &Path) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_null_values(Some(NullValues::AllColumnsSingle("NA".into())));

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None) // Scan entire file
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the product table
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    use product_columns as c;

    let context = file_label(path);
    let df = materialize_with_columns(&read_csv(path)?.lazy(), &c::ALL, &context)?;

    let names = string_values(&df, c::NAME, &context)?;
    let solubility = string_values(&df, c::SOLUBILITY, &context)?;
    let min_dose = f64_values(&df, c::MIN_DOSE, &context)?;
    let max_dose = f64_values(&df, c::MAX_DOSE, &context)?;
    let ade_pde = f64_values(&df, c::ADE_PDE, &context)?;
    let hardest = string_values(&df, c::HARDEST_TO_CLEAN, &context)?;
    let min_batch = f64_values(&df, c::MIN_BATCH, &context)?;
    let max_batch = f64_values(&df, c::MAX_BATCH, &context)?;
    let recovery = f64_values(&df, c::SWAB_RECOVERY, &context)?;
    let lod = f64_values(&df, c::LOD, &context)?;
    let loq = f64_values(&df, c::LOQ, &context)?;
    let dilution = f64_values(&df, c::SWAB_DILUTION, &context)?;
    let swab_surface = f64_values(&df, c::SWAB_SURFACE, &context)?;

    let mut products = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let name = names[idx]
            .clone()
            .ok_or_else(|| anyhow!("{}: row {} has no product name", context, idx + 1))?;

        products.push(Product {
            name,
            solubility: solubility[idx].clone(),
            min_dose_mg: min_dose[idx],
            max_dose_mg: max_dose[idx],
            ade_pde_ug_per_day: ade_pde[idx],
            hardest_to_clean: hardest[idx].clone(),
            min_batch_size_kg: min_batch[idx],
            max_batch_size_kg: max_batch[idx],
            swab_recovery_pct: recovery[idx],
            lod_ppm: lod[idx],
            loq_ppm: loq[idx],
            swab_dilution_ml: dilution[idx],
            swab_surface_area_m2: swab_surface[idx],
        });
    }

    Ok(products)
}

/// Load the equipment table
pub fn load_equipment(path: &Path) -> Result<Vec<EquipmentItem>> {
    use equipment_columns as c;

    let context = file_label(path);
    let df = materialize_with_columns(&read_csv(path)?.lazy(), &c::ALL, &context)?;

    let names = string_values(&df, c::NAME, &context)?;
    let ids = string_values(&df, c::ID, &context)?;
    let surfaces = f64_values(&df, c::SURFACE, &context)?;
    let usages = string_values(&df, c::USAGE, &context)?;
    let procedures = string_values(&df, c::CLEANING_PROCEDURE, &context)?;

    let mut equipment = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let name = names[idx].clone().unwrap_or_default();
        let id = ids[idx].clone().unwrap_or_default();
        if name.is_empty() && id.is_empty() {
            bail!("{}: row {} has neither equipment name nor id", context, idx + 1);
        }

        let surface_area_m2 = surfaces[idx].ok_or_else(|| {
            anyhow!("{}: row {} ({}) has no usable surface area", context, idx + 1, name)
        })?;

        equipment.push(EquipmentItem {
            name,
            id,
            surface_area_m2,
            usage: usages[idx].clone(),
            cleaning_procedure: procedures[idx].clone(),
        });
    }

    Ok(equipment)
}

/// Interpret a group cell as a whole, non-negative number
fn group_value(value: Option<f64>, context: &str, row: usize) -> Result<u32> {
    match value {
        Some(g) if g >= 0.0 && g.fract() == 0.0 && g <= u32::MAX as f64 => Ok(g as u32),
        Some(g) => bail!("{}: row {} has non-integer group {}", context, row + 1, g),
        None => bail!("{}: row {} has no group", context, row + 1),
    }
}

/// Load a `{Description, Group}` table
pub fn load_description_table(path: &Path, name: &str) -> Result<DescriptionTable> {
    let context = file_label(path);
    let df = materialize_with_columns(&read_csv(path)?.lazy(), &["Description", "Group"], &context)?;

    let descriptions = string_values(&df, "Description", &context)?;
    let groups = f64_values(&df, "Group", &context)?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        // Blank description rows can never match; skip them
        let Some(description) = descriptions[idx].clone() else {
            tracing::debug!("{}: skipping row {} with blank description", context, idx + 1);
            continue;
        };
        rows.push(DescriptionRow {
            description,
            group: group_value(groups[idx], &context, idx)?,
        });
    }

    DescriptionTable::new(name, rows).with_context(|| format!("{}: invalid {} table", context, name))
}

/// Load a `{Min, Max, Group}` table
pub fn load_range_table(path: &Path, name: &str) -> Result<RangeTable> {
    let context = file_label(path);
    let df = materialize_with_columns(&read_csv(path)?.lazy(), &["Min", "Max", "Group"], &context)?;

    let mins = f64_values(&df, "Min", &context)?;
    let maxs = f64_values(&df, "Max", &context)?;
    let groups = f64_values(&df, "Group", &context)?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (Some(min), Some(max)) = (mins[idx], maxs[idx]) else {
            bail!("{}: row {} has a missing Min/Max bound", context, idx + 1);
        };
        rows.push(RangeRow {
            min,
            max,
            group: group_value(groups[idx], &context, idx)?,
        });
    }

    RangeTable::new(name, rows).with_context(|| format!("{}: invalid {} table", context, name))
}
