//! Pressure vessel cost calculator
//!
//! # Pipeline
//! - Per-page text extraction from the specification PDF
//! - Regex extraction of vessel metadata, bill of materials and weight summary
//! - Material cost aggregation over a fixed $/lb rate table
//! - Optional AI cost enrichment with a deterministic fallback
//! - Styled Excel cost report generation

pub mod ai;
pub mod config;
pub mod cost;
pub mod parser;
pub mod pdf;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use parser::VesselInfo;
