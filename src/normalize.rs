// 🧹 Normalizer - Clean and canonicalize raw invoice fields
// Row-level coercion never fails: bad dates become sentinels, bad amounts 0

use chrono::NaiveDate;

use crate::keys;
use crate::model::{InvoiceRecord, RawInvoiceRow, Source};

/// Date formats accepted for the day-first `Invoice Date` column.
/// ISO dates are accepted last so `2024-01-05` still parses.
const DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Normalize a raw record set into matching-ready `InvoiceRecord`s.
///
/// Required-column presence is ingest's job and has already been enforced;
/// nothing here can fail at the row level. A row with an unparseable date or
/// amount still participates in matching and typically lands in an "-only"
/// category.
pub fn normalize_rows(rows: &[RawInvoiceRow], source: Source) -> Vec<InvoiceRecord> {
    rows.iter().map(|row| normalize_row(row, source)).collect()
}

fn normalize_row(row: &RawInvoiceRow, source: Source) -> InvoiceRecord {
    let row_id = row.serial_no.trim().to_string();
    let gstin = clean_identifier(&row.gstin);
    let invoice_number = clean_identifier(&row.invoice_number);
    let invoice_date = parse_day_first_date(&row.invoice_date);
    let taxable_value = scrub_amount(&row.taxable_value);

    let (full_key, partial_key) = keys::derive_keys(
        source,
        &row_id,
        &invoice_number,
        &gstin,
        invoice_date,
        taxable_value,
    );

    InvoiceRecord {
        source,
        row_id,
        gstin,
        trade_name: row.trade_name.trim().to_string(),
        invoice_number,
        invoice_date,
        invoice_value: scrub_amount(&row.invoice_value),
        taxable_value,
        igst: parse_amount(&row.igst),
        cgst: parse_amount(&row.cgst),
        sgst: parse_amount(&row.sgst),
        full_key,
        partial_key,
    }
}

/// Trim whitespace and uppercase. Used for the identity fields
/// (GSTIN, invoice number).
pub fn clean_identifier(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Day-first calendar date parse. Returns the sentinel (`None`) on failure,
/// never an error.
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Amount coercion for `Invoice Value` / `Taxable Value`: strip every
/// character that is not a digit or a decimal point, then parse. Failure or
/// emptiness yields 0 (e.g. "1.2.3" keeps both dots and fails the parse).
pub fn scrub_amount(raw: &str) -> f64 {
    let scrubbed: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    scrubbed.parse().unwrap_or(0.0)
}

/// Direct numeric parse for the tax columns (IGST/CGST/SGST); failure
/// yields 0.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(invoice_number: &str, date: &str, taxable: &str) -> RawInvoiceRow {
        RawInvoiceRow {
            serial_no: " 1 ".to_string(),
            gstin: " 29abcde1234f1z5 ".to_string(),
            trade_name: " Acme Traders ".to_string(),
            invoice_number: invoice_number.to_string(),
            invoice_date: date.to_string(),
            invoice_value: "1180".to_string(),
            taxable_value: taxable.to_string(),
            igst: "0".to_string(),
            cgst: "90".to_string(),
            sgst: "90".to_string(),
        }
    }

    #[test]
    fn test_identifiers_trimmed_and_uppercased() {
        let rows = vec![raw_row(" inv001 ", "01-01-2024", "1000")];
        let recs = normalize_rows(&rows, Source::Gstr2b);

        assert_eq!(recs[0].row_id, "1");
        assert_eq!(recs[0].gstin, "29ABCDE1234F1Z5");
        assert_eq!(recs[0].invoice_number, "INV001");
        assert_eq!(recs[0].trade_name, "Acme Traders");
    }

    #[test]
    fn test_day_first_date_parsing() {
        assert_eq!(
            parse_day_first_date("05-01-2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_day_first_date("05/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_day_first_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn test_unparseable_date_becomes_sentinel() {
        assert_eq!(parse_day_first_date("31-13-2024"), None);
        assert_eq!(parse_day_first_date("not a date"), None);
        assert_eq!(parse_day_first_date(""), None);
    }

    #[test]
    fn test_scrub_amount_strips_symbols() {
        assert_eq!(scrub_amount("₹1,234.50"), 1234.50);
        assert_eq!(scrub_amount(" 1 000 "), 1000.0);
        assert_eq!(scrub_amount("Rs. 99"), 0.99);
    }

    #[test]
    fn test_scrub_amount_failure_is_zero() {
        assert_eq!(scrub_amount("1.2.3"), 0.0);
        assert_eq!(scrub_amount(""), 0.0);
        assert_eq!(scrub_amount("n/a"), 0.0);
    }

    #[test]
    fn test_parse_amount_direct() {
        assert_eq!(parse_amount(" 90.5 "), 90.5);
        assert_eq!(parse_amount("-5"), -5.0);
        assert_eq!(parse_amount("1,000"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_keys_derived_on_normalize() {
        let rows = vec![raw_row("INV001", "31-01-2024", "1000")];
        let recs = normalize_rows(&rows, Source::Gstr2b);

        assert_eq!(recs[0].partial_key, "INV00129ABCDE1234F1Z531012024");
        assert_eq!(recs[0].full_key, "INV00129ABCDE1234F1Z5310120241000");
    }

    #[test]
    fn test_sentinel_row_still_normalizes() {
        let rows = vec![raw_row("INV001", "garbage", "not-a-number")];
        let recs = normalize_rows(&rows, Source::Ledger);

        assert_eq!(recs[0].invoice_date, None);
        assert_eq!(recs[0].taxable_value, 0.0);
        assert!(recs[0].full_key.contains("?LDG:"));
    }
}
