// ============================================================
// ROW / COLUMN FILTER
// ============================================================
// projection -> empty columns -> empty rows -> validation

use tracing::debug;

use super::field_validator::FieldRole;
use crate::domain::table::{is_row_blank, CleanReport, ColumnFilterOptions, Table, ValidationRules};

pub struct ColumnFilter<'a> {
    options: ColumnFilterOptions<'a>,
    rules: ValidationRules,
}

impl<'a> ColumnFilter<'a> {
    pub fn new(options: ColumnFilterOptions<'a>, rules: ValidationRules) -> Self {
        Self { options, rules }
    }

    /// Run every filter in order, recording what was removed
    pub fn apply(&self, table: &mut Table, report: &mut CleanReport) {
        self.project(table);

        if self.options.drop_empty_cols {
            report.empty_columns_dropped = drop_empty_columns(table);
        }
        if self.options.drop_empty_rows {
            report.empty_rows_dropped = drop_empty_rows(table);
        }
        if self.rules.is_active() {
            self.validate_rows(table, report);
        }
    }

    /// Keep the selected columns, in header order or selection order
    pub fn project(&self, table: &mut Table) {
        let mut indexes = table.resolve_columns(self.options.columns);
        if self.options.keep_order {
            indexes.sort_unstable();
        }
        table.project(&indexes);
    }

    /// Count invalid email/URL cells and drop rows where the matching removal flag is set
    fn validate_rows(&self, table: &mut Table, report: &mut CleanReport) {
        let checks: Vec<(usize, FieldRole, bool)> = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| {
                let role = FieldRole::detect(header)?;
                match role {
                    FieldRole::Email if self.rules.validate_email => {
                        Some((idx, role, self.rules.enforce_email()))
                    }
                    FieldRole::Url if self.rules.validate_url => {
                        Some((idx, role, self.rules.enforce_url()))
                    }
                    _ => None,
                }
            })
            .collect();

        if checks.is_empty() {
            debug!("No email/URL columns among the selected headers");
            return;
        }

        let before = table.rows.len();
        table.retain_rows(|row| {
            let mut keep = true;
            for &(idx, role, enforce) in &checks {
                let value = row.get(idx).map(String::as_str).unwrap_or("");
                if role.is_valid(value) {
                    continue;
                }
                match role {
                    FieldRole::Email => report.invalid_emails += 1,
                    FieldRole::Url => report.invalid_urls += 1,
                }
                if enforce {
                    keep = false;
                }
            }
            keep
        });
        report.invalid_rows_dropped = before - table.rows.len();
    }
}

/// Remove columns whose cells are all blank; returns how many were removed.
/// When every column is blank (a header-only file included) the header row is kept.
pub fn drop_empty_columns(table: &mut Table) -> usize {
    let keep: Vec<usize> = (0..table.width())
        .filter(|&idx| !table.is_column_blank(idx))
        .collect();
    if keep.is_empty() {
        debug!(columns = table.width(), "Every column is blank, keeping the header row");
        return 0;
    }
    let removed = table.width() - keep.len();
    if removed > 0 {
        table.project(&keep);
    }
    removed
}

/// Remove rows whose cells are all blank; returns how many were removed
pub fn drop_empty_rows(table: &mut Table) -> usize {
    let before = table.rows.len();
    table.retain_rows(|row| !is_row_blank(row));
    before - table.rows.len()
}
