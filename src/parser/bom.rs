//! Bill of materials extraction

use crate::pdf::PageText;
use regex::Regex;
use std::collections::BTreeMap;

use super::window_text;

/// First/last 1-based page numbers of the BOM table window.
const BOM_FIRST_PAGE: u32 = 20;
const BOM_LAST_PAGE: u32 = 26;

/// Component categories found on a vessel bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Heads,
    Shells,
    Nozzles,
    Flanges,
    Legs,
    Plates,
    Fasteners,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Heads,
        Category::Shells,
        Category::Nozzles,
        Category::Flanges,
        Category::Legs,
        Category::Plates,
        Category::Fasteners,
    ];

    /// Human-readable label used in line-item descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Heads => "F&D Heads",
            Category::Shells => "Cylindrical Shells",
            Category::Nozzles => "Nozzles",
            Category::Flanges => "Flanges",
            Category::Legs => "Support Legs",
            Category::Plates => "Reinforcing Plates",
            Category::Fasteners => "Fasteners",
        }
    }

    /// Report row name, e.g. "Heads".
    pub fn name(&self) -> &'static str {
        match self {
            Category::Heads => "Heads",
            Category::Shells => "Shells",
            Category::Nozzles => "Nozzles",
            Category::Flanges => "Flanges",
            Category::Legs => "Legs",
            Category::Plates => "Plates",
            Category::Fasteners => "Fasteners",
        }
    }
}

/// One itemized BOM line: component id, material spec, nominal thickness,
/// unit weight in pounds and quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct BomRecord {
    pub item_id: String,
    pub material: String,
    pub thickness: String,
    pub weight: f64,
    pub quantity: u32,
}

/// Category map; every category is present, possibly with an empty list.
pub type BomData = BTreeMap<Category, Vec<BomRecord>>;

/// Extract bill-of-materials records from the BOM page window.
///
/// Patterns are per-category; only the heads table currently has a working
/// pattern for this document family, the other categories stay empty until
/// a pattern is added for them. A record whose numeric fields fail to parse
/// is dropped; the rest of the table still extracts.
pub fn extract_bill_of_materials(pages: &PageText) -> BomData {
    let mut bom: BomData = Category::ALL.iter().map(|&c| (c, Vec::new())).collect();

    let text = window_text(pages, BOM_FIRST_PAGE, BOM_LAST_PAGE);

    let heads_patterns = [
        r"H(\d+)\s+F&D Head\s+([A-Z0-9\s-]+)\s+([0-9.]+)\s*(?:\(min\.\))?\s+(\d+)\s+OD\s+([0-9.]+)\s+(\d+)",
    ];

    for pattern in heads_patterns {
        if let Ok(re) = Regex::new(pattern) {
            for caps in re.captures_iter(&text) {
                let Some(record) = parse_head_record(&caps) else {
                    tracing::warn!("discarding BOM head row with unparseable numeric fields");
                    continue;
                };
                bom.entry(Category::Heads).or_default().push(record);
            }
        }
    }

    bom
}

fn parse_head_record(caps: &regex::Captures<'_>) -> Option<BomRecord> {
    let weight: f64 = caps.get(5)?.as_str().parse().ok()?;
    let quantity: u32 = caps.get(6)?.as_str().parse().ok()?;

    Some(BomRecord {
        item_id: format!("H{}", caps.get(1)?.as_str()),
        material: caps.get(2)?.as_str().trim().to_string(),
        thickness: caps.get(3)?.as_str().to_string(),
        weight,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom_pages(text: &str) -> PageText {
        [(20, text.to_string())].into_iter().collect()
    }

    #[test]
    fn extracts_a_well_formed_head_row() {
        let pages = bom_pages("H1 F&D Head SA-240 316 0.375 (min.) 48 OD 500 2");
        let bom = extract_bill_of_materials(&pages);

        let heads = &bom[&Category::Heads];
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].item_id, "H1");
        assert_eq!(heads[0].material, "SA-240 316");
        assert_eq!(heads[0].thickness, "0.375");
        assert_eq!(heads[0].weight, 500.0);
        assert_eq!(heads[0].quantity, 2);
    }

    #[test]
    fn records_keep_text_order() {
        let pages = bom_pages(
            "H1 F&D Head SA-240 316 0.375 48 OD 500 2\nH2 F&D Head SA-516 70 0.500 60 OD 750 1",
        );
        let bom = extract_bill_of_materials(&pages);
        let ids: Vec<_> = bom[&Category::Heads].iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["H1", "H2"]);
    }

    #[test]
    fn unparseable_numeric_fields_discard_only_that_record() {
        // The second row's quantity overflows u32 and must be dropped.
        let pages = bom_pages(
            "H1 F&D Head SA-240 316 0.375 48 OD 500 2\n\
             H2 F&D Head SA-516 70 0.500 60 OD 750 99999999999",
        );
        let bom = extract_bill_of_materials(&pages);
        assert_eq!(bom[&Category::Heads].len(), 1);
        assert_eq!(bom[&Category::Heads][0].item_id, "H1");
    }

    #[test]
    fn all_categories_are_present_even_when_empty() {
        let bom = extract_bill_of_materials(&PageText::new());
        assert_eq!(bom.len(), Category::ALL.len());
        assert!(bom.values().all(|records| records.is_empty()));
    }

    #[test]
    fn text_outside_the_bom_window_is_ignored() {
        let pages: PageText = [(2, "H1 F&D Head SA-240 316 0.375 48 OD 500 2".to_string())]
            .into_iter()
            .collect();
        let bom = extract_bill_of_materials(&pages);
        assert!(bom[&Category::Heads].is_empty());
    }
}
