// GST Reconciliation Tool - Core Library
// Exposes all modules for use in CLI, web server, and tests

pub mod classify;
pub mod error;
pub mod ingest;
pub mod keys;
pub mod model;
pub mod normalize;
pub mod quality;
pub mod reconciliation;
pub mod report;

// Re-export commonly used types
pub use error::{ReconError, Result};
pub use ingest::{load_rows, load_rows_from_bytes, REQUIRED_COLUMNS};
pub use model::{
    Deltas, InvoiceRecord, MatchTier, MatchedPair, MismatchPair, RawInvoiceRow, ReconSummary,
    Reconciliation, Source,
};
pub use normalize::normalize_rows;
pub use quality::{QualitySummary, SourceQuality};
pub use reconciliation::ReconciliationEngine;
pub use report::{build_tables, workbook_bytes, write_workbook, Cell, Table};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything one reconciliation run produces: the five-way partition plus
/// the coercion-fallback tallies observed while normalizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconRun {
    pub partition: Reconciliation,
    pub quality: QualitySummary,
}

/// Reconcile two already-loaded raw row sets. Pure: no I/O, no shared
/// state; every invocation gets fresh consumed-set bookkeeping.
pub fn reconcile_rows(gstr_rows: &[RawInvoiceRow], ledger_rows: &[RawInvoiceRow]) -> ReconRun {
    let quality = QualitySummary::scan(gstr_rows, ledger_rows);
    let gstr = normalize::normalize_rows(gstr_rows, Source::Gstr2b);
    let ledger = normalize::normalize_rows(ledger_rows, Source::Ledger);
    let partition = ReconciliationEngine::new().run(&gstr, &ledger);
    ReconRun { partition, quality }
}

/// Load both input files and reconcile them. Fails fast (with no partial
/// tables) when a file cannot be read or a required column is missing.
pub fn reconcile_files(gstr_path: &Path, ledger_path: &Path) -> Result<ReconRun> {
    let gstr_rows = ingest::load_rows(gstr_path, Source::Gstr2b)?;
    let ledger_rows = ingest::load_rows(ledger_path, Source::Ledger)?;
    let run = reconcile_rows(&gstr_rows, &ledger_rows);
    run.quality.log_concerns();
    Ok(run)
}
