//! Scalar field extraction - vessel number and customer

use regex::Regex;

/// Extract the vessel/tag number from the title pages.
/// Ordered candidates; the first pattern that matches wins.
pub fn extract_vessel_number(text: &str) -> Option<String> {
    let patterns = [
        r"Vessel No[:\s]+([A-Z0-9-]+)",
        r"Tag Number[:\s]+([A-Z0-9-]+)",
        r"V-(\d+)",
        r"Vessel\s*#?\s*([A-Z0-9-]+)",
    ];

    for pattern in patterns {
        if let Ok(re) = Regex::new(&format!("(?i){}", pattern)) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    return Some(m.as_str().to_string());
                }
            }
        }
    }

    None
}

/// Extract the customer/purchaser name. The capture stops at a line break
/// or at the next label that commonly follows it on the title block.
pub fn extract_customer(text: &str) -> Option<String> {
    let patterns = [
        r"Customer[:\s]+([A-Za-z\s&,\.]+?)(?:\n|Contract|Designer|$)",
        r"Purchaser[:\s]+([A-Za-z\s&,\.]+?)(?:\n|Contract|Designer|$)",
    ];

    for pattern in patterns {
        if let Ok(re) = Regex::new(&format!("(?i){}", pattern)) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    let customer = m.as_str().trim();
                    if !customer.is_empty() {
                        return Some(customer.to_string());
                    }
                }
            }
        }
    }

    None
}
