// 🧾 Core Data Model - Invoice records and reconciliation outcomes
// Everything here is created fresh per run and discarded afterwards

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// SOURCES
// ============================================================================

/// Which of the two input record sets a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Statutory side: the supplier-reported GSTR-2B purchase statement
    Gstr2b,
    /// Books side: the buyer's own accounting ledger
    Ledger,
}

impl Source {
    /// Human-readable name for display and error messages
    pub fn name(&self) -> &str {
        match self {
            Source::Gstr2b => "GSTR-2B",
            Source::Ledger => "Ledger",
        }
    }

    /// Short code for internal use (key sentinels, logging)
    pub fn code(&self) -> &str {
        match self {
            Source::Gstr2b => "G2B",
            Source::Ledger => "LDG",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// RAW INPUT ROW
// ============================================================================

/// One input row exactly as read from the sheet, before any coercion.
///
/// All ten accepted fields are held as strings; the Normalizer owns every
/// conversion so that ingest stays a dumb column-to-field mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInvoiceRow {
    pub serial_no: String,
    pub gstin: String,
    pub trade_name: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_value: String,
    pub taxable_value: String,
    pub igst: String,
    pub cgst: String,
    pub sgst: String,
}

// ============================================================================
// NORMALIZED RECORD
// ============================================================================

/// One fully normalized invoice row from either source.
///
/// `row_id` is the original S.No: unique within its source set, never
/// mutated, and the identity used for consumed-set bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub source: Source,
    pub row_id: String,

    /// 15-character supplier tax identifier, uppercased/trimmed
    pub gstin: String,

    /// Display only; never participates in matching
    pub trade_name: String,

    /// Primary business identifier, uppercased/trimmed
    pub invoice_number: String,

    /// Day-first calendar date; `None` is the unparseable sentinel.
    /// A sentinel never equals another sentinel or any valid date.
    pub invoice_date: Option<NaiveDate>,

    pub invoice_value: f64,
    pub taxable_value: f64,
    pub igst: f64,
    pub cgst: f64,
    pub sgst: f64,

    /// invoice_number + gstin + date (no separators) + taxable value
    pub full_key: String,

    /// Same as `full_key` minus the taxable-value component
    pub partial_key: String,
}

impl InvoiceRecord {
    /// Invoice date rendered the way the output sheets show it.
    /// Sentinel dates render as an empty cell.
    pub fn date_display(&self) -> String {
        match self.invoice_date {
            Some(d) => d.format("%d-%m-%Y").to_string(),
            None => String::new(),
        }
    }
}

// ============================================================================
// MATCHED PAIRS
// ============================================================================

/// Which tier of the matcher committed a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    /// Tier 1: full key matched exactly
    Exact,
    /// Tier 2: identity matched, taxable value differed beyond tolerance
    ValueMismatch,
}

/// Per-field deltas for a pair, computed as `ledger − gstr2b` and rounded
/// to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deltas {
    pub invoice_value: f64,
    pub taxable_value: f64,
    pub igst: f64,
    pub cgst: f64,
    pub sgst: f64,
}

impl Deltas {
    pub fn compute(gstr: &InvoiceRecord, ledger: &InvoiceRecord) -> Self {
        Deltas {
            invoice_value: round2(ledger.invoice_value - gstr.invoice_value),
            taxable_value: round2(ledger.taxable_value - gstr.taxable_value),
            igst: round2(ledger.igst - gstr.igst),
            cgst: round2(ledger.cgst - gstr.cgst),
            sgst: round2(ledger.sgst - gstr.sgst),
        }
    }

    pub fn all_zero(&self) -> bool {
        self.invoice_value == 0.0
            && self.taxable_value == 0.0
            && self.igst == 0.0
            && self.cgst == 0.0
            && self.sgst == 0.0
    }
}

/// A (GSTR-2B record, Ledger record) association created by Tier 1 or 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
    pub gstr: InvoiceRecord,
    pub ledger: InvoiceRecord,
    pub tier: MatchTier,
    pub deltas: Deltas,
}

impl MatchedPair {
    pub fn new(gstr: InvoiceRecord, ledger: InvoiceRecord, tier: MatchTier) -> Self {
        let deltas = Deltas::compute(&gstr, &ledger);
        MatchedPair {
            gstr,
            ledger,
            tier,
            deltas,
        }
    }
}

/// A Tier-3 pair: invoice numbers matched but a corroborating field did not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MismatchPair {
    pub gstr: InvoiceRecord,
    pub ledger: InvoiceRecord,
    /// Comma-separated labels, e.g. "GSTIN mismatch, Date mismatch"
    pub reason: String,
}

// ============================================================================
// PARTITION
// ============================================================================

/// The five-way disjoint partition produced by one matcher run.
///
/// Every GSTR-2B `row_id` appears in exactly one of
/// {matched, value_mismatched, not_matching, gstr_only}; symmetric for the
/// ledger side. Empty tables are a normal terminal state, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    pub matched: Vec<MatchedPair>,
    pub value_mismatched: Vec<MatchedPair>,
    pub not_matching: Vec<MismatchPair>,
    pub gstr_only: Vec<InvoiceRecord>,
    pub ledger_only: Vec<InvoiceRecord>,
}

impl Reconciliation {
    pub fn summary(&self) -> ReconSummary {
        ReconSummary {
            matched: self.matched.len(),
            value_mismatched: self.value_mismatched.len(),
            not_matching: self.not_matching.len(),
            gstr_only: self.gstr_only.len(),
            ledger_only: self.ledger_only.len(),
        }
    }

    /// True when every record on both sides found an exact partner.
    pub fn is_fully_matched(&self) -> bool {
        self.value_mismatched.is_empty()
            && self.not_matching.is_empty()
            && self.gstr_only.is_empty()
            && self.ledger_only.is_empty()
    }
}

/// Per-category row counts for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub matched: usize,
    pub value_mismatched: usize,
    pub not_matching: usize,
    pub gstr_only: usize,
    pub ledger_only: usize,
}

impl std::fmt::Display for ReconSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matched, {} value mismatched, {} not matching, {} GSTR-only, {} Ledger-only",
            self.matched, self.value_mismatched, self.not_matching, self.gstr_only, self.ledger_only
        )
    }
}

/// Round to 2 decimals, the precision every delta column carries.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================
