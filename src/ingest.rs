// 📂 Ingest - Load the two input files into raw row sets
// Fatal up-front validation: every required column must be present by name

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::NaiveDate;

use crate::error::{ReconError, Result};
use crate::model::{RawInvoiceRow, Source};

/// The ten columns every input must carry, by exact name after trimming.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "S.No",
    "GSTIN of Supplier",
    "Trade/Legal Name",
    "Invoice Number",
    "Invoice Date",
    "Invoice Value",
    "Taxable Value",
    "IGST",
    "CGST",
    "SGST",
];

/// Load one input file, dispatching on extension (.xlsx/.xlsm or .csv).
///
/// Column validation happens here, before any normalization: a missing
/// required column aborts the whole run with an error naming the source set
/// and the column.
pub fn load_rows(path: &Path, set: Source) -> Result<Vec<RawInvoiceRow>> {
    match extension_of(path).as_deref() {
        Some("xlsx") | Some("xlsm") => {
            let workbook: Xlsx<_> =
                open_workbook(path).map_err(|error| ReconError::Workbook { set, error })?;
            read_xlsx_rows(workbook, set)
        }
        Some("csv") => read_csv_rows(File::open(path)?, set),
        _ => Err(ReconError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load one input from an in-memory buffer (used by the upload handler),
/// dispatching on the uploaded file name.
pub fn load_rows_from_bytes(bytes: Vec<u8>, file_name: &str, set: Source) -> Result<Vec<RawInvoiceRow>> {
    match extension_of(Path::new(file_name)).as_deref() {
        Some("xlsx") | Some("xlsm") => {
            let workbook = Xlsx::new(Cursor::new(bytes))
                .map_err(|error| ReconError::Workbook { set, error })?;
            read_xlsx_rows(workbook, set)
        }
        Some("csv") => read_csv_rows(bytes.as_slice(), set),
        _ => Err(ReconError::UnsupportedFormat {
            path: Path::new(file_name).to_path_buf(),
        }),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

// ============================================================================
// XLSX
// ============================================================================

/// Read the first worksheet of a workbook into raw rows.
fn read_xlsx_rows<RS: Read + Seek>(mut workbook: Xlsx<RS>, set: Source) -> Result<Vec<RawInvoiceRow>> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ReconError::EmptyWorkbook { set })?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or(ReconError::EmptyWorkbook { set })?
        .map_err(|error| ReconError::Workbook { set, error })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_text(cell).trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    let indices = required_indices(&headers, set)?;

    let mut out = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        out.push(row_from_cells(&cells, &indices));
    }
    tracing::info!(set = %set, rows = out.len(), sheet = %sheet_name, "workbook loaded");
    Ok(out)
}

/// Render one cell as the text the Normalizer will coerce. Date cells
/// become day-first text so they parse the same way dates typed as strings
/// do; numeric cells use f64 Display (so `2.0` reads back as "2").
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::DateTime(serial) => match excel_serial_date(*serial) {
            Some(date) => date.format("%d-%m-%Y").to_string(),
            None => serial.to_string(),
        },
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Excel serial dates count days from 1899-12-30 (the 1900 epoch with the
/// historical leap-year quirk already absorbed).
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.trunc() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(chrono::Duration::days(days))
}

// ============================================================================
// CSV
// ============================================================================

fn read_csv_rows<R: Read>(reader: R, set: Source) -> Result<Vec<RawInvoiceRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|error| ReconError::Csv { set, error })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let indices = required_indices(&headers, set)?;

    let mut out = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|error| ReconError::Csv { set, error })?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        out.push(row_from_cells(&cells, &indices));
    }
    tracing::info!(set = %set, rows = out.len(), "CSV loaded");
    Ok(out)
}

// ============================================================================
// COLUMN MAPPING
// ============================================================================

/// Resolve the position of every required column, in declaration order, so
/// the first missing column is the one reported.
fn required_indices(headers: &[String], set: Source) -> Result<[usize; 10]> {
    let mut indices = [0usize; 10];
    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        indices[slot] = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn {
                set,
                column: name.to_string(),
            })?;
    }
    Ok(indices)
}

fn row_from_cells(cells: &[String], indices: &[usize; 10]) -> RawInvoiceRow {
    let cell = |slot: usize| cells.get(indices[slot]).cloned().unwrap_or_default();
    RawInvoiceRow {
        serial_no: cell(0),
        gstin: cell(1),
        trade_name: cell(2),
        invoice_number: cell(3),
        invoice_date: cell(4),
        invoice_value: cell(5),
        taxable_value: cell(6),
        igst: cell(7),
        cgst: cell(8),
        sgst: cell(9),
    }
}

// ============================================================================
// TESTS
// ============================================================================
