// ============================================================
// FIELD TRANSFORM PIPELINE
// ============================================================
// Per-cell rewrites in a fixed order:
// trim -> collapse whitespace -> case -> date -> type

use once_cell::sync::Lazy;
use regex::Regex;

use super::date_normalizer::to_iso_date;
use super::type_normalizer::normalize_type;
use crate::domain::table::{DateFormat, FieldTransformOptions, Table, TextCase};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Applies the configured transforms to every cell of a table
pub struct FieldTransformer {
    options: FieldTransformOptions,
}

impl FieldTransformer {
    pub fn new(options: FieldTransformOptions) -> Self {
        Self { options }
    }

    /// Transform one cell. Never fails: unrecognized values pass through.
    pub fn transform(&self, value: &str) -> String {
        let mut cell = if self.options.trim {
            value.trim().to_string()
        } else {
            value.to_string()
        };

        if self.options.collapse_spaces {
            cell = collapse_whitespace(&cell);
        }

        cell = apply_case(&cell, self.options.text_case);

        if self.options.date_format == DateFormat::Iso {
            cell = to_iso_date(&cell);
        }

        if self.options.normalize_types {
            cell = normalize_type(&cell);
        }

        cell
    }

    /// Transform every cell in place
    pub fn apply(&self, table: &mut Table) {
        if self.options.is_noop() {
            return;
        }
        table.map_cells(|cell| self.transform(cell));
    }
}

/// Replace each run of whitespace with a single space
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value, " ").into_owned()
}

pub fn apply_case(value: &str, text_case: TextCase) -> String {
    match text_case {
        TextCase::None => value.to_string(),
        TextCase::Lower => value.to_lowercase(),
        TextCase::Upper => value.to_uppercase(),
        TextCase::Title => title_case(value),
    }
}

/// Uppercase the first letter of each whitespace-separated token and
/// lowercase the rest, keeping the whitespace itself
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_token_start = true;
    for c in value.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_token_start = true;
        } else if at_token_start {
            out.extend(c.to_uppercase());
            at_token_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(options: FieldTransformOptions) -> FieldTransformer {
        FieldTransformer::new(options)
    }

    #[test]
    fn test_trim_and_collapse() {
        let t = transformer(FieldTransformOptions {
            trim: true,
            collapse_spaces: true,
            ..Default::default()
        });
        assert_eq!(t.transform("  John \t  Smith \n"), "John Smith");
    }

    #[test]
    fn test_collapse_without_trim_keeps_edges() {
        let t = transformer(FieldTransformOptions {
            collapse_spaces: true,
            ..Default::default()
        });
        assert_eq!(t.transform("  a   b  "), " a b ");
    }

    #[test]
    fn test_case_modes() {
        assert_eq!(apply_case("MiXeD", TextCase::Lower), "mixed");
        assert_eq!(apply_case("MiXeD", TextCase::Upper), "MIXED");
        assert_eq!(apply_case("jOHN o'neil  smith", TextCase::Title), "John O'neil  Smith");
        assert_eq!(apply_case("MiXeD", TextCase::None), "MiXeD");
    }

    #[test]
    fn test_order_date_after_trim() {
        let t = transformer(FieldTransformOptions {
            trim: true,
            date_format: DateFormat::Iso,
            ..Default::default()
        });
        assert_eq!(t.transform(" 3/4/2024 "), "2024-03-04");
        assert_eq!(t.transform("N/A"), "N/A");
    }

    #[test]
    fn test_title_case_then_type_normalization() {
        let t = transformer(FieldTransformOptions {
            trim: true,
            text_case: TextCase::Title,
            normalize_types: true,
            ..Default::default()
        });
        assert_eq!(t.transform(" yes "), "true");
        assert_eq!(t.transform("$1,000"), "1000");
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let options = FieldTransformOptions {
            trim: true,
            collapse_spaces: true,
            text_case: TextCase::Title,
            date_format: DateFormat::Iso,
            normalize_types: true,
        };
        let t = transformer(options);
        for raw in ["  jane   DOE ", "3/4/2024", "15%", "No", "  N/A  ", "€ 2,500.10"] {
            let once = t.transform(raw);
            assert_eq!(t.transform(&once), once, "not stable for {:?}", raw);
        }
    }

    #[test]
    fn test_apply_rewrites_table() {
        let mut table = Table::new(
            vec!["Name".to_string()],
            vec![vec!["  ann  ".to_string()]],
        );
        transformer(FieldTransformOptions {
            trim: true,
            text_case: TextCase::Upper,
            ..Default::default()
        })
        .apply(&mut table);

        assert_eq!(table.rows[0][0], "ANN");
        assert_eq!(table.headers[0], "Name");
    }
}
