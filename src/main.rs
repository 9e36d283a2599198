use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gst_recon::{reconcile_files, report, VERSION};

/// Reconcile a GSTR-2B purchase statement against ledger records and write
/// the five-way category report as a multi-sheet workbook.
#[derive(Parser)]
#[command(name = "gst-recon", version, about)]
struct Cli {
    /// GSTR-2B input file (.xlsx or .csv)
    gstr2b: PathBuf,

    /// Ledger input file (.xlsx or .csv)
    ledger: PathBuf,

    /// Output workbook path
    #[arg(short, long, default_value = "reconciliation_output.xlsx")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    println!("🧾 GSTR-2B vs Ledger Reconciliation v{VERSION}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading input files...");
    let run = reconcile_files(&cli.gstr2b, &cli.ledger).with_context(|| {
        format!(
            "reconciling {} against {}",
            cli.gstr2b.display(),
            cli.ledger.display()
        )
    })?;

    let summary = run.partition.summary();
    println!("✓ Reconciliation complete: {summary}");

    if !run.quality.is_clean() {
        let q = &run.quality;
        println!(
            "⚠️  Coercion fallbacks: GSTR-2B {} bad dates / {} zero-filled, Ledger {} bad dates / {} zero-filled",
            q.gstr2b.unparseable_dates,
            q.gstr2b.zero_filled_values + q.gstr2b.zero_filled_taxes,
            q.ledger.unparseable_dates,
            q.ledger.zero_filled_values + q.ledger.zero_filled_taxes,
        );
    }

    println!("\n💾 Writing report...");
    report::write_workbook(&cli.output, &run.partition)
        .with_context(|| format!("writing report to {}", cli.output.display()))?;
    println!("✓ Report written to {}", cli.output.display());

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if run.partition.is_fully_matched() {
        println!("🎉 All records matched exactly");
    } else {
        println!("📊 Review sheets: Value Mismatched / Not Matching / GSTR-Only / Ledger-Only");
    }

    Ok(())
}
