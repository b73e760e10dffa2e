// ============================================================
// TABLE
// ============================================================
// Header row plus data rows, every row as wide as the header

use serde::{Deserialize, Serialize};

/// A single data row. Always holds one cell per header.
pub type Row = Vec<String>;

/// In-memory table built by a decoder and mutated in place by each stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Per-row dedupe keys captured before projection; empty when not attached
    #[serde(skip)]
    pub row_keys: Vec<String>,
}

/// Trim and lowercase a header or selection token for lenient matching
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Table {
    /// Create a table, padding short rows with empty cells and truncating long ones
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            headers,
            rows,
            row_keys: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first header matching `name`, ignoring case and surrounding whitespace
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.headers
            .iter()
            .position(|header| normalize_name(header) == wanted)
    }

    /// Resolve a list of names to column indexes.
    /// Unknown names and repeats are skipped; the result follows the order of `names`.
    pub fn resolve_columns<S: AsRef<str>>(&self, names: &[S]) -> Vec<usize> {
        let mut resolved = Vec::new();
        for name in names {
            if let Some(idx) = self.find_column(name.as_ref()) {
                if !resolved.contains(&idx) {
                    resolved.push(idx);
                }
            }
        }
        resolved
    }

    /// Keep only the given columns, in the given order
    pub fn project(&mut self, indexes: &[usize]) {
        self.headers = indexes
            .iter()
            .filter_map(|&idx| self.headers.get(idx).cloned())
            .collect();
        for row in &mut self.rows {
            *row = indexes
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect();
        }
    }

    /// Keep rows matching `keep`, dropping their attached keys alongside them
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        let flags: Vec<bool> = self.rows.iter().map(|row| keep(row)).collect();
        if self.row_keys.len() == flags.len() {
            let mut flag = flags.iter();
            self.row_keys.retain(|_| flag.next().copied().unwrap_or(true));
        }
        let mut flag = flags.iter();
        self.rows.retain(|_| flag.next().copied().unwrap_or(true));
    }

    /// Whether every cell of the column is empty or whitespace-only
    pub fn is_column_blank(&self, idx: usize) -> bool {
        self.rows
            .iter()
            .all(|row| row.get(idx).map_or(true, |cell| cell.trim().is_empty()))
    }

    /// Apply `f` to every cell
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                let next = f(cell);
                if next != *cell {
                    *cell = next;
                }
            }
        }
    }
}

/// Whether every cell of the row is empty or whitespace-only
pub fn is_row_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
