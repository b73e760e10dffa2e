// ============================================================
// CLEAN REPORT
// ============================================================
// Counters collected while a request runs through the pipeline

use serde::{Deserialize, Serialize};

/// What the pipeline did to one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    /// Data rows after decode
    pub rows_in: usize,

    /// Data rows written by the encoder
    pub rows_out: usize,

    /// Columns after decode (blank headers already excluded)
    pub columns_in: usize,

    /// Columns written by the encoder
    pub columns_out: usize,

    pub empty_rows_dropped: usize,
    pub empty_columns_dropped: usize,

    /// Email cells that failed validation, whether or not their rows were removed
    pub invalid_emails: usize,

    /// URL cells that failed validation, whether or not their rows were removed
    pub invalid_urls: usize,

    pub invalid_rows_dropped: usize,
    pub duplicates_removed: usize,
}

impl CleanReport {
    /// Human-readable summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} rows, {} -> {} columns (empty rows: {}, empty columns: {}, invalid rows: {}, duplicates: {})",
            self.rows_in,
            self.rows_out,
            self.columns_in,
            self.columns_out,
            self.empty_rows_dropped,
            self.empty_columns_dropped,
            self.invalid_rows_dropped,
            self.duplicates_removed
        )
    }
}
