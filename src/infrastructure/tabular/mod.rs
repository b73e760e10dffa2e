// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// Decoding uploads into tables and encoding tables into files

mod csv_decoder;
mod csv_encoder;
mod spreadsheet_decoder;
mod xlsx_encoder;

pub use csv_decoder::CsvDecoder;
pub use csv_encoder::CsvEncoder;
pub use spreadsheet_decoder::SpreadsheetDecoder;
pub use xlsx_encoder::XlsxEncoder;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{InputFormat, OutputFormat, Table};

/// Decode bytes of a known input format
pub fn decode_table(format: InputFormat, bytes: &[u8]) -> Result<Table> {
    match format {
        InputFormat::Csv => CsvDecoder::new().decode(bytes),
        InputFormat::Spreadsheet => SpreadsheetDecoder::new().decode(bytes),
    }
}

/// Encode a table in the requested output format
pub fn encode_table(format: OutputFormat, table: &Table) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => CsvEncoder::new().encode(table),
        OutputFormat::Xlsx => XlsxEncoder::new().encode(table),
    }
}

/// Build a table from raw records where record 0 is the header row.
///
/// Headers are trimmed and blank ones are dropped together with their column.
/// Data rows are padded or truncated to the kept columns.
pub(crate) fn table_from_records(records: Vec<Vec<String>>) -> Result<Table> {
    let mut records = records.into_iter();
    let header_record = records
        .next()
        .ok_or_else(|| AppError::FormatError("File has no rows".to_string()))?;

    let kept: Vec<(usize, String)> = header_record
        .iter()
        .enumerate()
        .map(|(idx, header)| (idx, header.trim().to_string()))
        .filter(|(_, header)| !header.is_empty())
        .collect();

    if kept.is_empty() {
        return Err(AppError::FormatError("Header row is empty".to_string()));
    }

    let rows = records
        .map(|record| {
            kept.iter()
                .map(|(idx, _)| record.get(*idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    let headers = kept.into_iter().map(|(_, header)| header).collect();

    Ok(Table::new(headers, rows))
}
