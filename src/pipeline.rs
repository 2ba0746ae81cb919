//! Pipeline orchestrator - one PDF in, one cost report out

use crate::ai::{Enrichment, EnrichmentClient};
use crate::config::Config;
use crate::cost::aggregate_costs;
use crate::parser::{VesselInfo, extract_bill_of_materials, extract_weight_summary};
use crate::pdf;
use crate::report::{render_report, report_filename};
use anyhow::{Context, Result, bail};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Process one vessel specification PDF and write the cost calculator
/// workbook into `output_dir`, returning the written path.
///
/// Fails only when nothing at all could be extracted from the PDF or the
/// report cannot be written; every other sub-failure degrades: missing
/// fields render as "N/A", empty BOM categories produce no line items and
/// enrichment falls back to deterministic estimates.
pub async fn process_pdf(config: &Config, pdf_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    tracing::info!(pdf = %pdf_path.display(), "extracting text");
    let pages = pdf::extract_page_text(pdf_path, None, &config.key_pages)
        .with_context(|| format!("Error reading PDF: {}", pdf_path.display()))?;
    if pages.is_empty() {
        bail!("Failed to extract text from PDF: {}", pdf_path.display());
    }

    let vessel_info = VesselInfo::parse(&pages);
    let bom = extract_bill_of_materials(&pages);
    let weights = extract_weight_summary(&pages);
    let material_costs = aggregate_costs(&bom);
    tracing::info!(
        vessel = vessel_info.vessel_number.as_deref().unwrap_or("Unknown"),
        material_lines = material_costs.len(),
        "extraction complete"
    );

    let enrichment = match EnrichmentClient::from_config(config) {
        Ok(client) => client.analyze(&pages, &vessel_info, &weights).await,
        Err(e) => {
            tracing::warn!(error = %e, "enrichment client unavailable");
            Enrichment::unavailable(&vessel_info)
        }
    };
    if !enrichment.validation.warnings.is_empty() {
        tracing::warn!(warnings = ?enrichment.validation.warnings, "report warnings");
    }

    let filename = report_filename(
        enrichment.vessel_info.vessel_number.as_deref(),
        Local::now(),
    );
    let output_path = output_dir.join(filename);

    render_report(
        &enrichment.vessel_info,
        &material_costs,
        &enrichment.manual_costs,
        &enrichment.validation,
        &enrichment.analysis,
        &output_path,
    )?;
    tracing::info!(report = %output_path.display(), "report written");

    Ok(output_path)
}
