//! AI enrichment module - remote cost estimation with deterministic fallback

mod client;

pub use client::{CompletionApi, EnrichmentClient, OpenAiApi};

use crate::cost::ServiceCost;
use crate::parser::VesselInfo;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Confidence score and review warnings attached to a cost report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationResult {
    /// 0-10 scale
    #[serde(rename = "overall_confidence", default = "default_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            confidence: default_confidence(),
            warnings: Vec::new(),
        }
    }
}

fn default_confidence() -> u8 {
    7
}

/// Outcome of the enrichment step. Always produced, never an error: when
/// the remote call is disabled or fails the fields carry the no-enrichment
/// or fallback values instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Traditional vessel info merged with remote-supplied fields
    pub vessel_info: VesselInfo,
    /// Labor/service estimates keyed by service name
    pub manual_costs: BTreeMap<String, ServiceCost>,
    pub validation: ValidationResult,
    /// Narrative market analysis
    pub analysis: String,
}

impl Enrichment {
    /// The no-enrichment result: vessel info passes through unchanged, no
    /// service costs, default confidence, empty analysis.
    pub fn unavailable(vessel_info: &VesselInfo) -> Self {
        Self {
            vessel_info: vessel_info.clone(),
            manual_costs: BTreeMap::new(),
            validation: ValidationResult::default(),
            analysis: String::new(),
        }
    }
}
