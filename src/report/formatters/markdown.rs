use crate::report::{CleaningReport, ProductRow, ReportView};

/// Markdown formatter for cleaning reports
pub struct MarkdownFormatter;

fn opt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}", v))
}

fn opt_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

impl MarkdownFormatter {
    /// Format the selected view as markdown
    pub fn format(report: &CleaningReport, view: ReportView) -> String {
        let mut md = String::with_capacity(2048);
        md.push_str("# Cleaning Validation Limits\n\n");

        match view {
            ReportView::All => {
                Self::format_product_table(&mut md, report);
                Self::format_worst_case(&mut md, report);
                Self::format_maco(&mut md, report);
                Self::format_swab(&mut md, report);
                Self::format_rinse(&mut md, report);
                Self::format_rinse_volume(&mut md, report);
            }
            ReportView::Maco => {
                Self::format_product_table(&mut md, report);
                Self::format_maco(&mut md, report);
            }
            ReportView::Swab => {
                Self::format_product_table(&mut md, report);
                Self::format_swab(&mut md, report);
            }
            ReportView::Rinse => Self::format_rinse(&mut md, report),
            ReportView::RinseVolume => Self::format_rinse_volume(&mut md, report),
            ReportView::WorstCase => {
                Self::format_product_table(&mut md, report);
                Self::format_worst_case(&mut md, report);
            }
        }

        md
    }

    fn format_product_table(md: &mut String, report: &CleaningReport) {
        md.push_str("## Products\n\n");
        md.push_str(
            "| Product | Solubility | Min Dose (mg) | Max Dose (mg) | ADE/PDE (µg/day) | Hardest To Clean \
             | Min Batch (kg) | Max Batch (kg) | Swab Recovery (%) | LOD (ppm) | LOQ (ppm) \
             | Swab Dilution (mL) | Swab Surface (m²) | Solubility Grp | Dose Grp | Toxicity Grp \
             | Cleaning Grp | Rating | Batch/Dose |\n",
        );
        md.push_str("|---|---|---:|---:|---:|---|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|---:|\n");
        for row in &report.products {
            let p = &row.product;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
                p.name,
                opt_text(&p.solubility),
                opt_num(p.min_dose_mg),
                opt_num(p.max_dose_mg),
                opt_num(p.ade_pde_ug_per_day),
                opt_text(&p.hardest_to_clean),
                opt_num(p.min_batch_size_kg),
                opt_num(p.max_batch_size_kg),
                opt_num(p.swab_recovery_pct),
                opt_num(p.lod_ppm),
                opt_num(p.loq_ppm),
                opt_num(p.swab_dilution_ml),
                opt_num(p.swab_surface_area_m2),
                row.solubility_group,
                row.dose_group,
                row.toxicity_group,
                row.cleaning_group,
                row.worst_case_rating.map_or_else(|| "-".to_string(), |r| r.to_string()),
                row.batch_dose_ratio.map_or_else(|| "-".to_string(), |r| format!("{:.6}", r)),
            ));
        }
        md.push('\n');

        if !report.unrated_products.is_empty() {
            md.push_str(&format!(
                "⚠️ Not rated (missing group): {}\n\n",
                report.unrated_products.join(", ")
            ));
        }
    }

    fn format_worst_case(md: &mut String, report: &CleaningReport) {
        md.push_str("## Worst-Case Selection\n\n");
        md.push_str(&format!(
            "**Previous product (worst case):** {} (rating {})  \n",
            report.worst_cases.previous.name(),
            report.worst_cases.previous.worst_case_rating.unwrap_or_default()
        ));
        md.push_str(&format!(
            "**Next product (worst case):** {} (batch/dose {})\n\n",
            report.worst_cases.next.name(),
            report
                .worst_cases
                .next
                .batch_dose_ratio
                .map_or_else(|| "-".to_string(), |r| format!("{:.6}", r))
        ));
    }

    fn format_product_inputs(md: &mut String, label: &str, row: &ProductRow) {
        let p = &row.product;
        md.push_str(&format!(
            "- **{}:** {} (min dose {} mg, max dose {} mg, ADE/PDE {} µg/day, min batch {} kg, solubility {}, cleaning {})\n",
            label,
            p.name,
            opt_num(p.min_dose_mg),
            opt_num(p.max_dose_mg),
            opt_num(p.ade_pde_ug_per_day),
            opt_num(p.min_batch_size_kg),
            opt_text(&p.solubility),
            opt_text(&p.hardest_to_clean),
        ));
    }

    fn format_maco(md: &mut String, report: &CleaningReport) {
        md.push_str("## MACO\n\n");
        Self::format_product_inputs(md, "Previous", &report.worst_cases.previous);
        Self::format_product_inputs(md, "Next", &report.worst_cases.next);
        md.push('\n');

        md.push_str("| Method | MACO (mg) |\n");
        md.push_str("|--------|----------:|\n");
        md.push_str(&format!("| 10 ppm | {:.6} |\n", report.maco.ten_ppm_mg));
        md.push_str(&format!("| TDD | {:.6} |\n", report.maco.tdd_mg));
        md.push_str(&format!("| ADE/PDE | {:.6} |\n\n", report.maco.ade_pde_mg));
        md.push_str(&format!(
            "**Lowest MACO:** {:.6} mg ({})\n\n",
            report.maco.lowest_mg, report.maco.limiting_method
        ));
    }

    fn format_swab(md: &mut String, report: &CleaningReport) {
        let swab = &report.swab;
        md.push_str("## Swab Limit\n\n");
        md.push_str(&format!("- Lowest MACO: {:.6} mg\n", report.maco.lowest_mg));
        md.push_str(&format!("- Swab surface area: {} m²\n", swab.swab_surface_area_m2));
        md.push_str(&format!("- Total product-contact surface: {:.4} m²\n", swab.total_surface_area_m2));
        md.push_str(&format!(
            "- With {}× margin: {:.4} m²\n\n",
            swab.surface_margin, swab.total_surface_with_margin_m2
        ));
        md.push_str(&format!("**Swab limit:** {:.6} mg per swab\n\n", swab.swab_limit_mg));
    }

    fn format_rinse(md: &mut String, report: &CleaningReport) {
        md.push_str("## Rinse Limit per Equipment\n\n");
        md.push_str("| Equipment | ID | Surface (m²) | Rinse Limit (mg) |\n");
        md.push_str("|-----------|----|-------------:|-----------------:|\n");
        for row in &report.rinse {
            md.push_str(&format!(
                "| {} | {} | {} | {:.6} |\n",
                row.equipment_name, row.equipment_id, row.surface_area_m2, row.rinse_limit_mg
            ));
        }
        md.push('\n');
    }

    fn format_rinse_volume(md: &mut String, report: &CleaningReport) {
        md.push_str("## Rinse Volume per Equipment\n\n");
        md.push_str("| Equipment | ID | Surface (m²) | Volume (L) | Volume (mL) |\n");
        md.push_str("|-----------|----|-------------:|-----------:|------------:|\n");
        for row in &report.rinse {
            md.push_str(&format!(
                "| {} | {} | {} | {:.6} | {:.2} |\n",
                row.equipment_name,
                row.equipment_id,
                row.surface_area_m2,
                row.rinse_volume_l,
                row.rinse_volume_ml
            ));
        }
        md.push('\n');
    }
}
