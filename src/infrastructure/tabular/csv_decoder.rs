// ============================================================
// CSV DECODER
// ============================================================
// Parse CSV bytes with encoding fallback and delimiter detection

use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;

use super::table_from_records;
use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV decoder producing a [`Table`]
pub struct CsvDecoder {
    /// Delimiter byte; `None` means detect from the content
    delimiter: Option<u8>,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: None }
    }
}

impl CsvDecoder {
    /// Create a decoder that detects the delimiter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Decode raw bytes into a table
    pub fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let content = decode_text(bytes);
        self.decode_str(&content)
    }

    /// Decode already-decoded text into a table
    pub fn decode_str(&self, content: &str) -> Result<Table> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .trim(Trim::None)
            .flexible(true) // Spreadsheet exports often produce ragged rows
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::FormatError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        table_from_records(records)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe).
    /// A header line containing a comma always means comma. Otherwise only
    /// separators present in the header are scored, so a single-column file
    /// stays single-column whatever its cells contain.
    pub fn detect_delimiter(content: &str) -> u8 {
        let sample_lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(10)
            .collect();

        let Some(header) = sample_lines.first() else {
            return b',';
        };
        if header.contains(',') {
            return b',';
        }
        let candidates: Vec<u8> = [b';', b'\t', b'|']
            .into_iter()
            .filter(|candidate| header.as_bytes().contains(candidate))
            .collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// UTF-8 with optional BOM, falling back to Windows-1252 for legacy exports
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("CSV input is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "name,age,city\nAlice,30,NYC\nBob,25,LA";
        let table = CsvDecoder::new().decode_str(content).unwrap();

        assert_eq!(table.headers, vec!["name", "age", "city"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Alice", "30", "NYC"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvDecoder::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvDecoder::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvDecoder::detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(CsvDecoder::detect_delimiter("single"), b',');
        assert_eq!(CsvDecoder::detect_delimiter("a|b\n1|2"), b'|');
        assert_eq!(CsvDecoder::detect_delimiter("Tags\na;b\nc;d"), b',');
    }

    #[test]
    fn test_comma_header_wins_over_separators_inside_cells() {
        let content = "Name,Tags\nAnn,a;b;c;d;e\nBob,f;g;h;i;j\nCid,k;l;m;n;o\n";
        assert_eq!(CsvDecoder::detect_delimiter(content), b',');

        let table = CsvDecoder::new().decode_str(content).unwrap();
        assert_eq!(table.headers, vec!["Name", "Tags"]);
        assert_eq!(table.rows[0], vec!["Ann", "a;b;c;d;e"]);
    }

    #[test]
    fn test_cells_are_not_trimmed() {
        let table = CsvDecoder::new()
            .decode_str("Name,Email\n John , JOHN@X.COM ")
            .unwrap();

        assert_eq!(table.rows[0], vec![" John ", " JOHN@X.COM "]);
    }

    #[test]
    fn test_blank_headers_drop_their_columns() {
        let table = CsvDecoder::new()
            .decode_str(" Name ,, Email\nJohn,x,j@x.com\nJane")
            .unwrap();

        assert_eq!(table.headers, vec!["Name", "Email"]);
        assert_eq!(table.rows[0], vec!["John", "j@x.com"]);
        assert_eq!(table.rows[1], vec!["Jane", ""]);
    }

    #[test]
    fn test_long_rows_are_truncated() {
        let table = CsvDecoder::new().decode_str("a,b\n1,2,3,4").unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_quoted_fields() {
        let table = CsvDecoder::new()
            .decode_str("name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\nthen left\"")
            .unwrap();

        assert_eq!(table.rows[0][0], "Doe, Jane");
        assert_eq!(table.rows[0][1], "said \"hi\"\nthen left");
    }

    #[test]
    fn test_empty_input_is_format_error() {
        let err = CsvDecoder::new().decode(b"").unwrap_err();
        assert!(matches!(err, AppError::FormatError(_)));
    }

    #[test]
    fn test_bom_and_latin1_input() {
        let table = CsvDecoder::new().decode(b"\xEF\xBB\xBFcity\nParis").unwrap();
        assert_eq!(table.headers, vec!["city"]);

        let table = CsvDecoder::new().decode(b"city\nM\xFCnchen").unwrap();
        assert_eq!(table.rows[0][0], "M\u{fc}nchen");
    }
}
