// ✅ Quality Summary - Observe row-level coercion fallbacks
//
// The Normalizer silently maps unparseable dates to a sentinel and
// unparseable amounts to 0; matching behavior is unchanged by anything in
// this module. The summary only gives the caller something to log so a
// "legitimately zero" cell and a "failed to parse" cell stop looking alike
// in the run report.

use serde::{Deserialize, Serialize};

use crate::model::{RawInvoiceRow, Source};
use crate::normalize;

/// Coercion-fallback tallies for one source set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuality {
    pub rows: usize,

    /// Rows whose `Invoice Date` did not parse day-first
    pub unparseable_dates: usize,

    /// `Invoice Value` / `Taxable Value` cells that fell back to 0
    pub zero_filled_values: usize,

    /// IGST/CGST/SGST cells that fell back to 0
    pub zero_filled_taxes: usize,
}

impl SourceQuality {
    pub fn scan(rows: &[RawInvoiceRow]) -> Self {
        let mut quality = SourceQuality {
            rows: rows.len(),
            ..Default::default()
        };

        for row in rows {
            if normalize::parse_day_first_date(&row.invoice_date).is_none() {
                quality.unparseable_dates += 1;
            }
            quality.zero_filled_values += [row.invoice_value.as_str(), row.taxable_value.as_str()]
                .iter()
                .filter(|raw| amount_fell_back(raw, normalize::scrub_amount(raw)))
                .count();
            quality.zero_filled_taxes += [row.igst.as_str(), row.cgst.as_str(), row.sgst.as_str()]
                .iter()
                .filter(|raw| amount_fell_back(raw, normalize::parse_amount(raw)))
                .count();
        }

        quality
    }

    pub fn is_clean(&self) -> bool {
        self.unparseable_dates == 0 && self.zero_filled_values == 0 && self.zero_filled_taxes == 0
    }
}

/// A parsed 0 is a fallback only when the raw cell held something other
/// than an actual zero (or nothing at all with digits in it).
fn amount_fell_back(raw: &str, parsed: f64) -> bool {
    if parsed != 0.0 {
        return false;
    }
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>() != Ok(0.0)
}

/// Per-run quality view across both sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub gstr2b: SourceQuality,
    pub ledger: SourceQuality,
}

impl QualitySummary {
    pub fn scan(gstr_rows: &[RawInvoiceRow], ledger_rows: &[RawInvoiceRow]) -> Self {
        QualitySummary {
            gstr2b: SourceQuality::scan(gstr_rows),
            ledger: SourceQuality::scan(ledger_rows),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.gstr2b.is_clean() && self.ledger.is_clean()
    }

    /// Emit one warning per dirty source. Called once per run by the driver.
    pub fn log_concerns(&self) {
        for (source, quality) in [
            (Source::Gstr2b, &self.gstr2b),
            (Source::Ledger, &self.ledger),
        ] {
            if !quality.is_clean() {
                tracing::warn!(
                    set = %source,
                    unparseable_dates = quality.unparseable_dates,
                    zero_filled_values = quality.zero_filled_values,
                    zero_filled_taxes = quality.zero_filled_taxes,
                    "coercion fallbacks applied; affected rows matched with sentinel/zero values"
                );
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, taxable: &str, igst: &str) -> RawInvoiceRow {
        RawInvoiceRow {
            serial_no: "1".to_string(),
            gstin: "GSTIN1".to_string(),
            trade_name: "ACME".to_string(),
            invoice_number: "INV001".to_string(),
            invoice_date: date.to_string(),
            invoice_value: "1180".to_string(),
            taxable_value: taxable.to_string(),
            igst: igst.to_string(),
            cgst: "0".to_string(),
            sgst: "0".to_string(),
        }
    }

    #[test]
    fn test_clean_rows() {
        let quality = SourceQuality::scan(&[row("01-01-2024", "1000", "180")]);
        assert_eq!(quality.rows, 1);
        assert!(quality.is_clean());
    }

    #[test]
    fn test_unparseable_date_counted() {
        let quality = SourceQuality::scan(&[row("bad", "1000", "0")]);
        assert_eq!(quality.unparseable_dates, 1);
        assert!(!quality.is_clean());
    }

    #[test]
    fn test_zero_fill_counted() {
        let quality = SourceQuality::scan(&[row("01-01-2024", "n/a", "1,000")]);
        assert_eq!(quality.zero_filled_values, 1);
        assert_eq!(quality.zero_filled_taxes, 1);
    }

    #[test]
    fn test_genuine_zero_is_not_a_fallback() {
        let quality = SourceQuality::scan(&[row("01-01-2024", "0", "0.00")]);
        assert!(quality.is_clean());
    }

    #[test]
    fn test_empty_cell_is_not_flagged() {
        // Empty cells coerce to 0 by design; only non-empty garbage counts
        let quality = SourceQuality::scan(&[row("01-01-2024", "", "")]);
        assert_eq!(quality.zero_filled_values, 0);
        assert_eq!(quality.zero_filled_taxes, 0);
    }
}
