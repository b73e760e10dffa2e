// ============================================================
// SPREADSHEET DECODER
// ============================================================
// Read the first worksheet of an XLSX or XLS workbook

use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::{Duration, NaiveDate};

use super::table_from_records;
use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Workbook container, sniffed from the leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Xlsx,
    Xls,
}

#[derive(Default)]
pub struct SpreadsheetDecoder;

impl SpreadsheetDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode the first worksheet into a table
    pub fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let range = match sniff_container(bytes)? {
            Container::Xlsx => {
                let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(|e| {
                    AppError::FormatError(format!("Failed to open Excel file: {}", e))
                })?;
                first_sheet(&mut workbook)?
            }
            Container::Xls => {
                let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes)).map_err(|e| {
                    AppError::FormatError(format!("Failed to open Excel file: {}", e))
                })?;
                first_sheet(&mut workbook)?
            }
        };

        let records = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        table_from_records(records)
    }
}

fn sniff_container(bytes: &[u8]) -> Result<Container> {
    if bytes.starts_with(ZIP_MAGIC) {
        Ok(Container::Xlsx)
    } else if bytes.starts_with(OLE2_MAGIC) {
        Ok(Container::Xls)
    } else {
        Err(AppError::FormatError(
            "File is not a readable Excel workbook".to_string(),
        ))
    }
}

fn first_sheet<RS, R>(workbook: &mut R) -> Result<Range<Data>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FormatError("No worksheet found".to_string()))?
        .map_err(|e| AppError::FormatError(format!("Failed to read Excel range: {}", e)))
}

/// Stringify a cell the way it reads in a spreadsheet UI
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => format_float(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => format_excel_serial(value.as_f64()),
        other => other.to_string(),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Last serial Excel can display as a date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Excel serial day number (1900 date system) to `YYYY-MM-DD[ HH:MM:SS]`.
/// Serials outside Excel's date range (or NaN) are kept as plain numbers.
fn format_excel_serial(serial: f64) -> String {
    if !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return format_float(serial);
    }
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return format_float(serial);
    };

    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    let Some(moment) = epoch
        .checked_add_signed(Duration::days(days))
        .and_then(|d| d.checked_add_signed(Duration::seconds(seconds)))
    else {
        return format_float(serial);
    };

    if seconds == 0 {
        moment.format("%Y-%m-%d").to_string()
    } else {
        moment.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_sniff_container() {
        assert_eq!(sniff_container(b"PK\x03\x04rest").unwrap(), Container::Xlsx);
        assert_eq!(sniff_container(OLE2_MAGIC).unwrap(), Container::Xls);
        assert!(sniff_container(b"name,email").is_err());
    }

    #[test]
    fn test_non_workbook_bytes_are_format_error() {
        let err = SpreadsheetDecoder::new().decode(b"not a workbook").unwrap_err();
        assert!(matches!(err, AppError::FormatError(_)));
    }

    #[test]
    fn test_cell_stringification() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(-4)), "-4");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
        assert_eq!(cell_to_string(&Data::String(" x ".to_string())), " x ");
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(format_excel_serial(45355.0), "2024-03-04");
        assert_eq!(format_excel_serial(45355.5), "2024-03-04 12:00:00");
        assert_eq!(format_excel_serial(MAX_EXCEL_SERIAL), "9999-12-31");
    }

    #[test]
    fn test_out_of_range_serials_stay_numeric() {
        assert_eq!(format_excel_serial(1e300), format_float(1e300));
        assert_eq!(format_excel_serial(-1e300), format_float(-1e300));
        assert_eq!(format_excel_serial(-1.0), "-1");
        assert_eq!(format_excel_serial(f64::NAN), "NaN");
        assert_eq!(
            cell_to_string(&Data::DateTime(ExcelDateTime::new(
                1e300,
                ExcelDateTimeType::DateTime,
                false
            ))),
            format_float(1e300)
        );
    }
}
