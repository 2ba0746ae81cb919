//! Report rendering - styled Excel cost calculator output

use crate::ai::ValidationResult;
use crate::cost::{CostSource, MaterialCost, ServiceCost};
use crate::parser::{Category, VesselInfo};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const SHEET_TITLE: &str = "AI-ENHANCED PRESSURE VESSEL COST CALCULATOR";
const COLUMN_WIDTHS: [f64; 6] = [20.0, 35.0, 15.0, 15.0, 18.0, 15.0];
const TITLE_BAND_COLOR: u32 = 0x1F4E79;
const HEADER_BAND_COLOR: u32 = 0x366092;

/// Output file name: vessel number (or "Unknown") plus a generation
/// timestamp so repeated runs on the same input never collide.
pub fn report_filename(vessel_number: Option<&str>, now: DateTime<Local>) -> String {
    format!(
        "{}_Cost_Calculator_{}.xlsx",
        vessel_number.unwrap_or("Unknown"),
        now.format("%Y%m%d_%H%M")
    )
}

/// Render the cost calculator workbook to `output_path`.
///
/// The workbook is built in memory and moved into place atomically; a
/// failed write never leaves a partial file behind. An existing file at
/// the path is overwritten.
pub fn render_report(
    vessel_info: &VesselInfo,
    material_costs: &BTreeMap<Category, MaterialCost>,
    manual_costs: &BTreeMap<String, ServiceCost>,
    validation: &ValidationResult,
    analysis: &str,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Cost Calculator")?;

    let title_format = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(TITLE_BAND_COLOR))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BAND_COLOR));
    let money_format = Format::new().set_num_format("$#,##0.00");
    let weight_format = Format::new().set_num_format("#,##0.0");
    let total_format = Format::new().set_bold().set_num_format("$#,##0.00");

    worksheet.merge_range(0, 0, 0, 6, SHEET_TITLE, &title_format)?;

    let mut row: u32 = 2;

    let na = |field: &Option<String>| field.clone().unwrap_or_else(|| "N/A".to_string());
    let vessel_items = [
        ("Vessel Number:", na(&vessel_info.vessel_number)),
        ("Customer:", na(&vessel_info.customer)),
        ("Design Pressure:", na(&vessel_info.design_pressure)),
        ("Design Temperature:", na(&vessel_info.design_temperature)),
        ("Material Grade:", na(&vessel_info.material_grade)),
        ("Report Date:", Local::now().format("%Y-%m-%d").to_string()),
        ("AI Confidence:", format!("{}/10", validation.confidence)),
    ];
    for (label, value) in vessel_items {
        worksheet.write(row, 0, label)?;
        worksheet.write(row, 1, value)?;
        row += 1;
    }

    row += 2;

    let headers = [
        "ITEM",
        "DESCRIPTION",
        "WEIGHT (lbs)",
        "RATE ($/lb)",
        "TOTAL COST ($)",
        "SOURCE",
    ];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_with_format(row, col as u16, *header, &header_format)?;
    }
    row += 1;

    let mut grand_total = 0.0;

    for (category, cost) in material_costs {
        worksheet.write(row, 0, category.name())?;
        worksheet.write(row, 1, cost.description.as_str())?;
        worksheet.write_number_with_format(row, 2, cost.weight, &weight_format)?;
        worksheet.write(row, 3, format!("${}", trim_rate(cost.rate)))?;
        worksheet.write_number_with_format(row, 4, cost.total_cost, &money_format)?;
        worksheet.write(row, 5, CostSource::BomExtract.to_string())?;
        grand_total += cost.total_cost;
        row += 1;
    }

    for (service, cost) in manual_costs {
        worksheet.write(row, 0, title_case(service))?;
        worksheet.write(row, 1, service_note(cost.source))?;
        worksheet.write(row, 2, "Service")?;
        worksheet.write(row, 3, format!("${}/{}", trim_rate(cost.unit_cost), cost.unit))?;
        worksheet.write_number_with_format(row, 4, cost.total_cost, &money_format)?;
        worksheet.write(row, 5, cost.source.to_string())?;
        grand_total += cost.total_cost;
        row += 1;
    }

    row += 1;
    worksheet.write_with_format(row, 3, "TOTAL PROJECT COST:", &Format::new().set_bold())?;
    worksheet.write_number_with_format(row, 4, grand_total, &total_format)?;

    if !analysis.is_empty() {
        row += 2;
        worksheet.write(row, 0, "Market Analysis:")?;
        worksheet.write(row, 1, analysis)?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    let buffer = workbook.save_to_buffer()?;

    let dir = output_path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
        .context("failed to create temporary report file")?;
    temp.write_all(&buffer)
        .context("failed to write report data")?;
    temp.persist(output_path)
        .with_context(|| format!("failed to move report into place: {}", output_path.display()))?;

    Ok(())
}

/// "$9" rather than "$9.00" for whole-dollar rates.
fn trim_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.0}", rate)
    } else {
        format!("{}", rate)
    }
}

fn service_note(source: CostSource) -> &'static str {
    match source {
        CostSource::AiEstimate => "AI estimate",
        CostSource::Fallback => "Fallback estimate",
        CostSource::BomExtract => "BOM extract",
    }
}

/// "legs_fabrication" -> "Legs Fabrication"
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
