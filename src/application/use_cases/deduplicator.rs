// ============================================================
// DEDUPLICATOR
// ============================================================
// First occurrence wins on a composite key of cleaned values

use std::collections::HashSet;

use crate::domain::table::{DedupeOptions, Row, Table};

/// Joins key parts; a control character that does not occur in real cells
const KEY_SEPARATOR: char = '\u{1F}';

pub struct Deduplicator<'a> {
    options: DedupeOptions<'a>,
}

impl<'a> Deduplicator<'a> {
    pub fn new(options: DedupeOptions<'a>) -> Self {
        Self { options }
    }

    /// Record each row's key against the full header row, before any column is
    /// projected away. Unknown key names are ignored.
    pub fn attach_keys(&self, table: &mut Table) {
        let key_columns = table.resolve_columns(self.options.keys);
        table.row_keys = if key_columns.is_empty() {
            Vec::new()
        } else {
            table
                .rows
                .iter()
                .map(|row| composite_key(row, &key_columns))
                .collect()
        };
    }

    /// Remove later rows whose key was already seen; returns how many were removed.
    /// Uses keys attached earlier, otherwise resolves them against the current headers.
    pub fn apply(&self, table: &mut Table) -> usize {
        if table.row_keys.len() != table.rows.len() {
            self.attach_keys(table);
        }
        let keys = std::mem::take(&mut table.row_keys);
        if keys.is_empty() {
            return 0;
        }

        let before = table.rows.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let mut first = keys.into_iter().map(|key| seen.insert(key));
        table.rows.retain(|_| first.next().unwrap_or(true));
        before - table.rows.len()
    }
}

fn composite_key(row: &Row, key_columns: &[usize]) -> String {
    let mut key = String::new();
    for (position, &idx) in key_columns.iter().enumerate() {
        if position > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(row.get(idx).map(String::as_str).unwrap_or(""));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn people() -> Table {
        Table::new(
            strings(&["First", "Last", "Email"]),
            vec![
                strings(&["Ann", "Lee", "ann@x.com"]),
                strings(&["Bob", "Ray", "bob@x.com"]),
                strings(&["Ann", "Lee", "ann2@x.com"]),
                strings(&["ann", "Lee", "ann@x.com"]),
                strings(&["Bob", "Ray", "bob@x.com"]),
            ],
        )
    }

    #[test]
    fn test_single_key_keeps_first_occurrence() {
        let keys = strings(&["email"]);
        let mut table = people();
        let removed = Deduplicator::new(DedupeOptions { keys: &keys }).apply(&mut table);

        assert_eq!(removed, 2);
        let emails: Vec<&str> = table.rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(emails, vec!["ann@x.com", "bob@x.com", "ann2@x.com"]);
        assert_eq!(table.rows[0][0], "Ann");
    }

    #[test]
    fn test_composite_key_is_case_sensitive() {
        let keys = strings(&["First", "LAST", "unknown"]);
        let mut table = people();
        let removed = Deduplicator::new(DedupeOptions { keys: &keys }).apply(&mut table);

        assert_eq!(removed, 2);
        let firsts: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(firsts, vec!["Ann", "Bob", "ann"]);
    }

    #[test]
    fn test_no_resolvable_keys_disables_dedupe() {
        let keys = strings(&["phone"]);
        let mut table = people();
        assert_eq!(Deduplicator::new(DedupeOptions { keys: &keys }).apply(&mut table), 0);
        assert_eq!(table.rows.len(), 5);

        let empty: Vec<String> = Vec::new();
        assert_eq!(Deduplicator::new(DedupeOptions { keys: &empty }).apply(&mut table), 0);
    }

    #[test]
    fn test_attached_keys_survive_projection_and_row_removal() {
        let keys = strings(&["Email"]);
        let dedupe = Deduplicator::new(DedupeOptions { keys: &keys });
        let mut table = people();
        dedupe.attach_keys(&mut table);
        table.project(&[0]);
        let mut position = 0;
        table.retain_rows(|_| {
            position += 1;
            position != 2
        });

        let removed = dedupe.apply(&mut table);

        assert_eq!(removed, 1);
        let firsts: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(firsts, vec!["Ann", "Ann", "Bob"]);
        assert!(table.row_keys.is_empty());
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        let keys = strings(&["a", "b"]);
        let mut table = Table::new(
            strings(&["a", "b"]),
            vec![strings(&["ab", "c"]), strings(&["a", "bc"])],
        );
        assert_eq!(Deduplicator::new(DedupeOptions { keys: &keys }).apply(&mut table), 0);
    }
}
