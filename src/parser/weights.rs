//! Weight summary extraction - aggregate operating weight and surface area

use crate::pdf::PageText;
use regex::Regex;

use super::window_text;

/// First/last 1-based page numbers of the weight summary window.
const WEIGHT_FIRST_PAGE: u32 = 13;
const WEIGHT_LAST_PAGE: u32 = 18;

/// Aggregate figures from the vessel weight summary table. A missing value
/// means the table did not report it; downstream consumers must treat that
/// as absent, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightSummary {
    pub total_operating_weight: Option<f64>,
    pub surface_area: Option<f64>,
}

/// Extract the weight summary from its page window. Ordered candidate
/// patterns per metric; thousands separators are stripped before parsing
/// and a value that fails to parse falls through to the next pattern.
pub fn extract_weight_summary(pages: &PageText) -> WeightSummary {
    let text = window_text(pages, WEIGHT_FIRST_PAGE, WEIGHT_LAST_PAGE);

    WeightSummary {
        total_operating_weight: extract_metric(
            &text,
            &[
                r"Operating Weight\s*\(lb\)\s*(\d+,?\d*)",
                r"Operating\s+(\d+,?\d*)",
            ],
        ),
        surface_area: extract_metric(
            &text,
            &[r"Surface Area\s*\(ft[²2]\)\s*(\d+)", r"Surface Area\s*(\d+)"],
        ),
    }
}

fn extract_metric(text: &str, patterns: &[&str]) -> Option<f64> {
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Ok(value) = m.as_str().replace(',', "").parse::<f64>() {
                        return Some(value);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_pages(text: &str) -> PageText {
        [(14, text.to_string())].into_iter().collect()
    }

    #[test]
    fn operating_weight_strips_thousands_separator() {
        let summary = extract_weight_summary(&weight_pages("Operating Weight (lb) 12,345"));
        assert_eq!(summary.total_operating_weight, Some(12345.0));
    }

    #[test]
    fn surface_area_accepts_unicode_and_ascii_units() {
        let unicode = extract_weight_summary(&weight_pages("Surface Area (ft²) 158"));
        assert_eq!(unicode.surface_area, Some(158.0));

        let ascii = extract_weight_summary(&weight_pages("Surface Area (ft2) 200"));
        assert_eq!(ascii.surface_area, Some(200.0));
    }

    #[test]
    fn bare_label_fallback_patterns_apply() {
        let summary = extract_weight_summary(&weight_pages("Operating 4500\nSurface Area 90"));
        assert_eq!(summary.total_operating_weight, Some(4500.0));
        assert_eq!(summary.surface_area, Some(90.0));
    }

    #[test]
    fn missing_metrics_stay_absent() {
        let summary = extract_weight_summary(&weight_pages("no tables on this page"));
        assert_eq!(summary, WeightSummary::default());
    }

    #[test]
    fn text_outside_the_window_is_ignored() {
        let pages: PageText = [(2, "Operating Weight (lb) 12,345".to_string())]
            .into_iter()
            .collect();
        let summary = extract_weight_summary(&pages);
        assert_eq!(summary.total_operating_weight, None);
    }
}
