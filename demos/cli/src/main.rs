use std::path::PathBuf;

use anyhow::Context;
use checkup_analysis::analyze_records_str;
use checkup_core::AnalysisConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "checkup-cli",
    about = "Generate a health analysis report from examination-record JSON."
)]
struct Args {
    /// Path to the records JSON file.
    #[arg(short, long)]
    input: PathBuf,

    /// Print the full report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("could not read file {:?}", args.input))?;

    let config = AnalysisConfig::default();
    let report = analyze_records_str(&data, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Generated at: {}\nItems examined: {}\nAbnormal items: {}",
        report.generated_at, report.aggregate.total, report.aggregate.abnormal
    );

    if let Some(risk) = report.risk {
        println!(
            "Health score: {}\nRisk level: {}",
            risk.band.label(),
            risk.tier.label()
        );
    }

    println!("\n{}", report.narrative);
    if !report.recommendations.is_empty() {
        println!("{}", report.recommendations);
    }

    Ok(())
}
