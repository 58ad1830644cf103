use crate::error::IngestError;
use crate::models::{BankCodeRecord, NewBankCode};
use crate::store::SwiftStore;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub const FIELDS_PER_ROW: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub total_rows: usize,
    pub inserted: usize,
    pub skipped: usize,
}

pub fn ingest_file(store: &SwiftStore, path: &Path) -> Result<IngestSummary, IngestError> {
    let rows = read_rows(path)?;
    ingest_rows(store, &rows)
}

/// Reads every row of the source as strings. `.csv` files go through the CSV
/// reader; anything else is opened as a workbook and its first sheet is used.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, IngestError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_csv_rows(path)
    } else {
        read_workbook_rows(path)
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| unreadable(path, err))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| unreadable(path, err))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<String>>, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|err| unreadable(path, err))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable(path, "workbook has no sheets"))?
        .map_err(|err| unreadable(path, err))?;

    Ok(range.rows().map(row_values).collect())
}

// Trailing blank cells are dropped so a short row stays short, as it would in
// a CSV export of the same sheet.
fn row_values(cells: &[Data]) -> Vec<String> {
    let mut values: Vec<String> = cells.iter().map(|cell| cell.to_string()).collect();
    while values.last().is_some_and(|value| value.trim().is_empty()) {
        values.pop();
    }
    values
}

fn unreadable(path: &Path, reason: impl ToString) -> IngestError {
    IngestError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Loads data rows into the store. Row 0 is the header. Rows with fewer than
/// eight fields are skipped; the first invalid or rejected row stops the run,
/// leaving earlier rows in place.
pub fn ingest_rows(store: &SwiftStore, rows: &[Vec<String>]) -> Result<IngestSummary, IngestError> {
    if rows.len() < 2 {
        return Err(IngestError::InsufficientData { rows: rows.len() });
    }

    let mut summary = IngestSummary::default();
    for (index, row) in rows.iter().enumerate().skip(1) {
        summary.total_rows += 1;

        let Some(raw) = NewBankCode::from_fields(row) else {
            log::debug!(
                "skipping row {}: {} of {} fields",
                index,
                row.len(),
                FIELDS_PER_ROW
            );
            summary.skipped += 1;
            continue;
        };

        let record = BankCodeRecord::try_from(raw)
            .map_err(|source| IngestError::InvalidRecord { row: index, source })?;
        store
            .insert(&record)
            .map_err(|source| IngestError::Insert { row: index, source })?;
        summary.inserted += 1;
    }

    log::info!(
        "ingested {} record(s) from {} data row(s), skipped {}",
        summary.inserted,
        summary.total_rows,
        summary.skipped
    );
    Ok(summary)
}
