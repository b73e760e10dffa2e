// ============================================================
// XLSX ENCODER
// ============================================================

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

const SHEET_NAME: &str = "Cleaned";
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Single-sheet workbook writer, header row first, every cell as text
#[derive(Default)]
pub struct XlsxEncoder;

impl XlsxEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        if table.width() > MAX_COLUMNS {
            return Err(AppError::EncodingError(format!(
                "{} columns exceed the XLSX limit of {}",
                table.width(),
                MAX_COLUMNS
            )));
        }
        if table.row_count() + 1 > MAX_ROWS {
            return Err(AppError::EncodingError(format!(
                "{} rows exceed the XLSX limit of {}",
                table.row_count() + 1,
                MAX_ROWS
            )));
        }

        let mut workbook = Workbook::new();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(SHEET_NAME).map_err(to_encoding_error)?;

            for (col, header) in table.headers.iter().enumerate() {
                worksheet
                    .write_string(0, col as u16, header)
                    .map_err(to_encoding_error)?;
            }

            for (index, row) in table.rows.iter().enumerate() {
                let row_num = (index + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(row_num, col as u16, cell)
                        .map_err(to_encoding_error)?;
                }
            }
        }

        workbook.save_to_buffer().map_err(to_encoding_error)
    }
}

fn to_encoding_error(err: XlsxError) -> AppError {
    AppError::EncodingError(format!("Failed to write XLSX: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_zip_container() {
        let table = Table::new(
            vec!["Name".to_string()],
            vec![vec!["Jane".to_string()]],
        );
        let bytes = XlsxEncoder::new().encode(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_too_many_columns_is_encoding_error() {
        let headers = (0..=MAX_COLUMNS).map(|i| format!("c{}", i)).collect();
        let table = Table::new(headers, Vec::new());

        let err = XlsxEncoder::new().encode(&table).unwrap_err();
        assert!(matches!(err, AppError::EncodingError(_)));
    }
}
