// Mismatch classification for Tier-3 candidate pairs

use chrono::NaiveDate;

use crate::model::InvoiceRecord;

/// Fixed tolerance separating a genuine taxable-value mismatch from
/// rounding noise. The check is strict: a difference of exactly 0.01 is
/// not a mismatch.
pub const TAXABLE_TOLERANCE: f64 = 0.01;

/// GSTIN disagreement between a candidate pair.
pub fn gstin_differs(gstr: &InvoiceRecord, ledger: &InvoiceRecord) -> bool {
    gstr.gstin != ledger.gstin
}

/// Date disagreement. A sentinel date never equals another sentinel date or
/// any valid date, so the pair differs unless both sides parsed to the same
/// calendar day.
pub fn date_differs(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

/// f64 subtraction can overshoot the tolerance by representation error when
/// the true difference is exactly 0.01; the strict `>` must not trip on that.
const BOUNDARY_EPS: f64 = 1e-9;

/// Taxable-value disagreement beyond tolerance (strict `>`).
pub fn taxable_differs(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() > tolerance + BOUNDARY_EPS
}

/// Evaluate the three predicates in fixed order and render the
/// comma-separated reason label. Returns `None` when the pair disagrees on
/// nothing, which the matcher uses as its Tier-3 retention check; every
/// pair that reaches the output has at least one reason.
pub fn mismatch_reason(
    gstr: &InvoiceRecord,
    ledger: &InvoiceRecord,
    tolerance: f64,
) -> Option<String> {
    let mut reasons = Vec::new();

    if gstin_differs(gstr, ledger) {
        reasons.push("GSTIN mismatch");
    }
    if date_differs(gstr.invoice_date, ledger.invoice_date) {
        reasons.push("Date mismatch");
    }
    if taxable_differs(gstr.taxable_value, ledger.taxable_value, tolerance) {
        reasons.push("Taxable Value mismatch");
    }

    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(", "))
    }
}
