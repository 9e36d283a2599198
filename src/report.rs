// 📊 Report Assembler - Render the five category tables into a workbook
// Empty tables are skipped when writing; sheet layouts follow the audit
// review format (both S.No columns, side-by-side values, delta columns)

use std::path::Path;

use rust_xlsxwriter::Workbook;
use serde::Serialize;

use crate::error::Result;
use crate::model::{InvoiceRecord, MatchedPair, MismatchPair, Reconciliation};

// ============================================================================
// TABLE MODEL
// ============================================================================

/// One cell of an output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// One named output table, ready for any serializer.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build all five tables in their fixed order. Tables are always present
/// here (possibly with zero rows); only the workbook writer skips empties.
pub fn build_tables(recon: &Reconciliation) -> Vec<Table> {
    vec![
        pair_table("Matched Invoices", &recon.matched),
        only_table("GSTR-Only", "GSTR2B S.No", &recon.gstr_only),
        only_table("Ledger-Only", "Ledger S.No", &recon.ledger_only),
        pair_table("Value Mismatched", &recon.value_mismatched),
        mismatch_table("Not Matching", &recon.not_matching),
    ]
}

fn pair_table(name: &str, pairs: &[MatchedPair]) -> Table {
    let columns = vec![
        "GSTR2B S.No".to_string(),
        "Ledger S.No".to_string(),
        "GSTIN of Supplier".to_string(),
        "Trade/Legal Name".to_string(),
        "Invoice Number".to_string(),
        "Invoice Date".to_string(),
        "GSTR2B Invoice Value".to_string(),
        "Ledger Invoice Value".to_string(),
        "Difference: Invoice Value".to_string(),
        "GSTR2B Taxable Value".to_string(),
        "Ledger Taxable Value".to_string(),
        "Difference: Taxable Value".to_string(),
        "GSTR2B IGST".to_string(),
        "Ledger IGST".to_string(),
        "Difference: IGST".to_string(),
        "GSTR2B CGST".to_string(),
        "Ledger CGST".to_string(),
        "Difference: CGST".to_string(),
        "GSTR2B SGST".to_string(),
        "Ledger SGST".to_string(),
        "Difference: SGST".to_string(),
    ];

    let rows = pairs
        .iter()
        .map(|pair| {
            // Identity fields are shown from the GSTR-2B side
            vec![
                Cell::text(&pair.gstr.row_id),
                Cell::text(&pair.ledger.row_id),
                Cell::text(&pair.gstr.gstin),
                Cell::text(&pair.gstr.trade_name),
                Cell::text(&pair.gstr.invoice_number),
                Cell::text(pair.gstr.date_display()),
                Cell::Number(pair.gstr.invoice_value),
                Cell::Number(pair.ledger.invoice_value),
                Cell::Number(pair.deltas.invoice_value),
                Cell::Number(pair.gstr.taxable_value),
                Cell::Number(pair.ledger.taxable_value),
                Cell::Number(pair.deltas.taxable_value),
                Cell::Number(pair.gstr.igst),
                Cell::Number(pair.ledger.igst),
                Cell::Number(pair.deltas.igst),
                Cell::Number(pair.gstr.cgst),
                Cell::Number(pair.ledger.cgst),
                Cell::Number(pair.deltas.cgst),
                Cell::Number(pair.gstr.sgst),
                Cell::Number(pair.ledger.sgst),
                Cell::Number(pair.deltas.sgst),
            ]
        })
        .collect();

    Table {
        name: name.to_string(),
        columns,
        rows,
    }
}

fn mismatch_table(name: &str, pairs: &[MismatchPair]) -> Table {
    let columns = vec![
        "GSTR2B S.No".to_string(),
        "Ledger S.No".to_string(),
        "Invoice Number".to_string(),
        "GSTR2B GSTIN".to_string(),
        "Ledger GSTIN".to_string(),
        "GSTR2B Invoice Date".to_string(),
        "Ledger Invoice Date".to_string(),
        "GSTR2B Taxable Value".to_string(),
        "Ledger Taxable Value".to_string(),
        "Mismatch Reason".to_string(),
    ];

    let rows = pairs
        .iter()
        .map(|pair| {
            vec![
                Cell::text(&pair.gstr.row_id),
                Cell::text(&pair.ledger.row_id),
                Cell::text(&pair.gstr.invoice_number),
                Cell::text(&pair.gstr.gstin),
                Cell::text(&pair.ledger.gstin),
                Cell::text(pair.gstr.date_display()),
                Cell::text(pair.ledger.date_display()),
                Cell::Number(pair.gstr.taxable_value),
                Cell::Number(pair.ledger.taxable_value),
                Cell::text(&pair.reason),
            ]
        })
        .collect();

    Table {
        name: name.to_string(),
        columns,
        rows,
    }
}

/// The "-only" sheets show the normalized input columns with the source's
/// S.No first; the internal key columns never leave the matcher.
fn only_table(name: &str, serial_header: &str, records: &[InvoiceRecord]) -> Table {
    let columns = vec![
        serial_header.to_string(),
        "GSTIN of Supplier".to_string(),
        "Trade/Legal Name".to_string(),
        "Invoice Number".to_string(),
        "Invoice Date".to_string(),
        "Invoice Value".to_string(),
        "Taxable Value".to_string(),
        "IGST".to_string(),
        "CGST".to_string(),
        "SGST".to_string(),
    ];

    let rows = records
        .iter()
        .map(|rec| {
            vec![
                Cell::text(&rec.row_id),
                Cell::text(&rec.gstin),
                Cell::text(&rec.trade_name),
                Cell::text(&rec.invoice_number),
                Cell::text(rec.date_display()),
                Cell::Number(rec.invoice_value),
                Cell::Number(rec.taxable_value),
                Cell::Number(rec.igst),
                Cell::Number(rec.cgst),
                Cell::Number(rec.sgst),
            ]
        })
        .collect();

    Table {
        name: name.to_string(),
        columns,
        rows,
    }
}

// ============================================================================
// WORKBOOK WRITER
// ============================================================================

/// Write the report workbook to a path, skipping empty tables.
pub fn write_workbook(path: &Path, recon: &Reconciliation) -> Result<()> {
    let mut workbook = build_workbook(recon)?;
    workbook.save(path)?;
    tracing::info!(path = %path.display(), "reconciliation report written");
    Ok(())
}

/// Serialize the report workbook into memory (used by the upload handler).
pub fn workbook_bytes(recon: &Reconciliation) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(recon)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(recon: &Reconciliation) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    for table in build_tables(recon) {
        if table.is_empty() {
            continue;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }
        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_string((row_idx + 1) as u32, col_idx as u16, value)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number((row_idx + 1) as u32, col_idx as u16, *value)?;
                    }
                }
            }
        }

        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    Ok(workbook)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchTier, RawInvoiceRow, Source};
    use crate::normalize;
    use crate::reconciliation::ReconciliationEngine;
    use calamine::{open_workbook, Reader, Xlsx};

    fn raw(serial_no: &str, invoice_number: &str, taxable: &str) -> RawInvoiceRow {
        RawInvoiceRow {
            serial_no: serial_no.to_string(),
            gstin: "GSTIN1".to_string(),
            trade_name: "ACME TRADERS".to_string(),
            invoice_number: invoice_number.to_string(),
            invoice_date: "01-01-2024".to_string(),
            invoice_value: "1180".to_string(),
            taxable_value: taxable.to_string(),
            igst: "0".to_string(),
            cgst: "90".to_string(),
            sgst: "90".to_string(),
        }
    }

    fn reconcile(
        gstr_rows: Vec<RawInvoiceRow>,
        ledger_rows: Vec<RawInvoiceRow>,
    ) -> Reconciliation {
        let gstr = normalize::normalize_rows(&gstr_rows, Source::Gstr2b);
        let ledger = normalize::normalize_rows(&ledger_rows, Source::Ledger);
        ReconciliationEngine::new().run(&gstr, &ledger)
    }

    #[test]
    fn test_five_tables_in_fixed_order() {
        let tables = build_tables(&Reconciliation::default());
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Matched Invoices",
                "GSTR-Only",
                "Ledger-Only",
                "Value Mismatched",
                "Not Matching"
            ]
        );
        assert!(tables.iter().all(Table::is_empty));
    }

    #[test]
    fn test_matched_table_layout() {
        let recon = reconcile(
            vec![raw("1", "INV001", "1000")],
            vec![raw("9", "INV001", "1000")],
        );
        assert_eq!(recon.matched[0].tier, MatchTier::Exact);

        let tables = build_tables(&recon);
        let matched = &tables[0];
        assert_eq!(matched.columns.len(), 21);
        assert_eq!(matched.rows.len(), 1);
        assert_eq!(matched.rows[0][0], Cell::Text("1".to_string()));
        assert_eq!(matched.rows[0][1], Cell::Text("9".to_string()));
        assert_eq!(matched.rows[0][5], Cell::Text("01-01-2024".to_string()));
        // Difference: Taxable Value
        assert_eq!(matched.rows[0][11], Cell::Number(0.0));
    }

    #[test]
    fn test_only_table_has_no_key_columns() {
        let recon = reconcile(vec![raw("1", "INV001", "1000")], vec![]);
        let tables = build_tables(&recon);
        let gstr_only = &tables[1];

        assert_eq!(gstr_only.rows.len(), 1);
        assert!(gstr_only.columns.iter().all(|c| !c.to_lowercase().contains("key")));
        assert_eq!(gstr_only.columns[0], "GSTR2B S.No");
    }

    #[test]
    fn test_workbook_skips_empty_sheets() {
        let recon = reconcile(
            vec![raw("1", "INV001", "1000")],
            vec![raw("9", "INV001", "1000")],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &recon).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["Matched Invoices".to_string()]
        );
    }

    #[test]
    fn test_workbook_round_trip() {
        let recon = reconcile(
            vec![
                raw("1", "INV001", "1000"),
                raw("2", "INV002", "2000"),
            ],
            vec![raw("9", "INV001", "1000")],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_workbook(&path, &recon).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let sheets = workbook.sheet_names().to_vec();
        assert!(sheets.contains(&"Matched Invoices".to_string()));
        assert!(sheets.contains(&"GSTR-Only".to_string()));

        let range = workbook
            .worksheet_range("GSTR-Only")
            .unwrap()
            .unwrap();
        // Header row + the one unmatched record
        assert_eq!(range.rows().count(), 2);
    }

    #[test]
    fn test_workbook_bytes_non_empty() {
        let recon = reconcile(
            vec![raw("1", "INV001", "1000")],
            vec![raw("9", "INV001", "1000")],
        );
        let bytes = workbook_bytes(&recon).unwrap();
        // XLSX containers start with the ZIP magic
        assert_eq!(&bytes[..2], b"PK");
    }
}
