// ============================================================
// CSV ENCODER
// ============================================================

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

/// RFC 4180 writer: fields are quoted only when they contain the delimiter,
/// a quote, or a line break; embedded quotes are doubled
pub struct CsvEncoder {
    delimiter: u8,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        // A record with no fields has no CSV representation
        if table.headers.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(quote_style(table))
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(&table.headers)
            .map_err(|e| AppError::EncodingError(format!("Failed to write CSV header: {}", e)))?;

        for (index, row) in table.rows.iter().enumerate() {
            writer.write_record(row).map_err(|e| {
                AppError::EncodingError(format!("Failed to write CSV row {}: {}", index + 1, e))
            })?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::EncodingError(format!("Failed to flush CSV output: {}", e)))
    }
}

/// Minimal quoting, except for a lone header holding another separator:
/// decoders sniffing the header would split on it, so every field is quoted.
fn quote_style(table: &Table) -> QuoteStyle {
    match table.headers.as_slice() {
        [header] if header.contains([';', '\t', '|']) => QuoteStyle::Always,
        _ => QuoteStyle::Necessary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let table = Table::new(
            strings(&["Name", "Note"]),
            vec![
                strings(&["John", "plain"]),
                strings(&["Doe, Jane", "said \"hi\""]),
                strings(&["Multi", "a\nb"]),
            ],
        );

        let output = String::from_utf8(CsvEncoder::new().encode(&table).unwrap()).unwrap();

        assert_eq!(
            output,
            "Name,Note\nJohn,plain\n\"Doe, Jane\",\"said \"\"hi\"\"\"\nMulti,\"a\nb\"\n"
        );
    }

    #[test]
    fn test_lone_header_with_separator_is_quoted() {
        let table = Table::new(strings(&["a;b"]), vec![strings(&["x;y"])]);
        let output = String::from_utf8(CsvEncoder::new().encode(&table).unwrap()).unwrap();
        assert_eq!(output, "\"a;b\"\n\"x;y\"\n");
    }

    #[test]
    fn test_no_columns_writes_nothing() {
        let table = Table::new(Vec::new(), vec![Vec::new()]);
        assert!(CsvEncoder::new().encode(&table).unwrap().is_empty());
    }
}
