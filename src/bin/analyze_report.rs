//! Utility to analyze one extracted report from the command line.
//!
//! Reads a report JSON file, optionally detects the issuing bureau from a
//! raw text dump, validates the data and prints the results as JSON.

use credit_ai_core::bureau::BureauIdentifier;
use credit_ai_core::config::AnalysisConfig;
use credit_ai_core::models::ExtractedReport;
use credit_ai_core::tariff::TariffDecisionEngine;
use credit_ai_core::validator::FieldValidator;
use dotenvy::dotenv;
use serde_json::json;
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let report_path = args
        .next()
        .ok_or("usage: analyze_report <report.json> [raw_text.txt]")?;
    let text_path = args.next();

    let report: ExtractedReport = serde_json::from_str(&fs::read_to_string(&report_path)?)?;

    let detection = match text_path {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            Some(BureauIdentifier::new().detect(&text))
        }
        None => None,
    };

    let validation = FieldValidator::validate(&report);

    let config = AnalysisConfig::from_env()?;
    let decision = TariffDecisionEngine::new(config).decide_report(&report);

    let output = json!({
        "bureau_detection": detection,
        "validation": validation,
        "decision": decision,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
