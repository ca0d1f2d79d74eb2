//! Decodes uploaded or local CSV / XLSX bytes into a [`Dataset`].

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::dataset::{Cell, Dataset};
use crate::error::LoadError;

/// Input file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Xlsx,
}

impl DataFormat {
    /// Picks a format from a file name, URL path or upload filename.
    pub fn from_file_name(name: &str) -> Option<Self> {
        // Drop any query string or fragment so URLs resolve by their path.
        let path = name.split(['?', '#']).next().unwrap_or(name);
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Some(DataFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(DataFormat::Xlsx)
        } else {
            None
        }
    }

    /// Like [`DataFormat::from_file_name`] but fails with a [`LoadError`].
    pub fn detect(name: &str) -> Result<Self, LoadError> {
        Self::from_file_name(name).ok_or_else(|| LoadError::UnsupportedFormat(name.to_string()))
    }
}

/// Decodes `bytes` in the given format.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] for malformed CSV (including ragged rows) and
/// [`LoadError::Spreadsheet`] for anything calamine cannot open.
pub fn parse_dataset(bytes: &[u8], format: DataFormat) -> Result<Dataset, LoadError> {
    match format {
        DataFormat::Csv => parse_csv(bytes),
        DataFormat::Xlsx => parse_xlsx(bytes),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(Dataset::new(columns, rows))
}

fn parse_xlsx(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Spreadsheet("workbook has no worksheets".to_string()))?
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let columns = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Dataset::default()),
    };

    let rows = sheet_rows
        .map(|row| row.iter().map(xlsx_cell).collect())
        .collect();

    Ok(Dataset::new(columns, rows))
}

fn xlsx_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from_text(s),
        other => Cell::from_text(&other.to_string()),
    }
}
