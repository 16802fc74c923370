use crate::report::{CleaningReport, ReportView};
use serde_json::{json, Value};

/// JSON formatter for cleaning reports
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format the selected view as pretty-printed JSON
    pub fn format(report: &CleaningReport, view: ReportView) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::view_value(report, view)?)
    }

    /// Format the selected view as compact JSON (no whitespace)
    pub fn format_compact(report: &CleaningReport, view: ReportView) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Self::view_value(report, view)?)
    }

    fn view_value(report: &CleaningReport, view: ReportView) -> Result<Value, serde_json::Error> {
        Ok(match view {
            ReportView::All => serde_json::to_value(report)?,
            ReportView::Maco => json!({
                "products": serde_json::to_value(&report.products)?,
                "previous_product": report.worst_cases.previous.name(),
                "next_product": report.worst_cases.next.name(),
                "maco": serde_json::to_value(&report.maco)?,
            }),
            ReportView::Swab => json!({
                "products": serde_json::to_value(&report.products)?,
                "lowest_maco_mg": report.maco.lowest_mg,
                "swab": serde_json::to_value(&report.swab)?,
            }),
            ReportView::Rinse => json!({
                "lowest_maco_mg": report.maco.lowest_mg,
                "total_surface_with_margin_m2": report.swab.total_surface_with_margin_m2,
                "rinse": serde_json::to_value(&report.rinse)?,
            }),
            ReportView::RinseVolume => json!({
                "rinse_volume": report
                    .rinse
                    .iter()
                    .map(|row| json!({
                        "equipment_name": row.equipment_name,
                        "equipment_id": row.equipment_id,
                        "surface_area_m2": row.surface_area_m2,
                        "rinse_volume_l": row.rinse_volume_l,
                        "rinse_volume_ml": row.rinse_volume_ml,
                    }))
                    .collect::<Vec<_>>(),
            }),
            ReportView::WorstCase => json!({
                "products": serde_json::to_value(&report.products)?,
                "worst_cases": serde_json::to_value(&report.worst_cases)?,
                "unrated_products": report.unrated_products,
            }),
        })
    }
}
