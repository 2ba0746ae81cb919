//! Text analysis module - extraction of vessel data from page text

mod bom;
mod fields;
mod weights;

pub use bom::{BomData, BomRecord, Category, extract_bill_of_materials};
pub use weights::{WeightSummary, extract_weight_summary};

use crate::pdf::PageText;
use serde::Deserialize;

/// Scalar vessel metadata pulled from the specification sheet.
///
/// Fields that no pattern matched stay `None`; the report renderer is the
/// one that substitutes "N/A" at render time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VesselInfo {
    pub vessel_number: Option<String>,
    pub customer: Option<String>,
    pub design_pressure: Option<String>,
    pub design_temperature: Option<String>,
    pub material_grade: Option<String>,
}

impl VesselInfo {
    /// Parse vessel metadata from the title pages (1-3).
    pub fn parse(pages: &PageText) -> Self {
        let text = window_text(pages, 1, 3);
        Self {
            vessel_number: fields::extract_vessel_number(&text),
            customer: fields::extract_customer(&text),
            ..Self::default()
        }
    }

    /// Merge enriched metadata over this one. Fields present in `other`
    /// win; fields it omits keep their current value.
    pub fn merge(&self, other: &VesselInfo) -> Self {
        Self {
            vessel_number: other.vessel_number.clone().or_else(|| self.vessel_number.clone()),
            customer: other.customer.clone().or_else(|| self.customer.clone()),
            design_pressure: other
                .design_pressure
                .clone()
                .or_else(|| self.design_pressure.clone()),
            design_temperature: other
                .design_temperature
                .clone()
                .or_else(|| self.design_temperature.clone()),
            material_grade: other
                .material_grade
                .clone()
                .or_else(|| self.material_grade.clone()),
        }
    }
}

/// Concatenate the text of pages `first..=last` (1-based page numbers).
/// Pages missing from the extraction are simply skipped.
pub(crate) fn window_text(pages: &PageText, first: u32, last: u32) -> String {
    let mut text = String::new();
    for page_number in first..=last {
        if let Some(page) = pages.get(&page_number) {
            text.push_str(page);
            text.push('\n');
        }
    }
    text
}
