//! Vessel cost calculator - command line entry point

use anyhow::Result;
use std::path::PathBuf;
use vessel_cost_calculator::{Config, pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging
    tracing_subscriber::fmt::init();

    // Environment variables
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let Some(pdf_path) = args.next() else {
        eprintln!("Usage: vessel_cost_calculator <input.pdf> [output_dir]");
        std::process::exit(2);
    };
    let pdf_path = PathBuf::from(pdf_path);
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let config = Config::from_env();
    let output = pipeline::process_pdf(&config, &pdf_path, &output_dir).await?;
    println!("{}", output.display());

    Ok(())
}
