//! Material cost aggregation over BOM data

use crate::parser::{BomData, Category};
use std::collections::BTreeMap;
use std::fmt;

/// Where a cost figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    BomExtract,
    AiEstimate,
    Fallback,
}

impl fmt::Display for CostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostSource::BomExtract => write!(f, "BOM Extract"),
            CostSource::AiEstimate => write!(f, "AI estimate"),
            CostSource::Fallback => write!(f, "Fallback"),
        }
    }
}

/// A material line item priced off extracted BOM weight.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCost {
    pub description: String,
    /// Total weight in pounds (unit weight x quantity, summed per category)
    pub weight: f64,
    /// $/lb multiplier
    pub rate: f64,
    pub total_cost: f64,
}

/// A labor/service line item, estimated rather than weighed.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCost {
    pub unit_cost: f64,
    pub unit: String,
    pub total_cost: f64,
    pub source: CostSource,
}

/// Fixed $/lb multiplier per category. Fasteners carry no rate and are
/// never costed.
pub fn rate_for(category: Category) -> Option<f64> {
    match category {
        Category::Heads => Some(9.0),
        Category::Shells => Some(13.0),
        Category::Nozzles => Some(8.0),
        Category::Flanges => Some(7.0),
        Category::Legs => Some(5.0),
        Category::Plates => Some(6.0),
        Category::Fasteners => None,
    }
}

/// Price the extracted BOM: for each rated category with positive aggregate
/// weight, `total_cost = sum(weight x quantity) x rate`. Categories with no
/// records or zero weight produce no line item at all. Pure function; safe
/// to re-run over the same data.
pub fn aggregate_costs(bom: &BomData) -> BTreeMap<Category, MaterialCost> {
    let mut costs = BTreeMap::new();

    for (&category, records) in bom {
        let Some(rate) = rate_for(category) else {
            continue;
        };

        let total_weight: f64 = records
            .iter()
            .map(|r| r.weight * f64::from(r.quantity))
            .sum();
        if total_weight <= 0.0 {
            continue;
        }

        costs.insert(
            category,
            MaterialCost {
                description: format!("{} {}", records.len(), category.label()),
                weight: total_weight,
                rate,
                total_cost: total_weight * rate,
            },
        );
    }

    costs
}
