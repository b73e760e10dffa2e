// ============================================================
// CLEAN OPTIONS
// ============================================================
// Immutable per-request configuration and the per-stage views of it

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};

/// Case transform applied to every cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    None,
    Lower,
    Upper,
    Title,
}

impl FromStr for TextCase {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(TextCase::None),
            "lower" => Ok(TextCase::Lower),
            "upper" => Ok(TextCase::Upper),
            "title" => Ok(TextCase::Title),
            other => Err(AppError::ValidationError(format!(
                "textCase must be one of none|lower|upper|title, got '{}'",
                other
            ))),
        }
    }
}

/// Date rewriting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    #[default]
    None,
    Iso,
}

impl FromStr for DateFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(DateFormat::None),
            "iso" => Ok(DateFormat::Iso),
            other => Err(AppError::ValidationError(format!(
                "dateFormat must be one of none|iso, got '{}'",
                other
            ))),
        }
    }
}

/// Encoding of the cleaned file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv; charset=utf-8",
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "csv" => Ok(OutputFormat::Csv),
            "xlsx" => Ok(OutputFormat::Xlsx),
            other => Err(AppError::ValidationError(format!(
                "outputFormat must be one of csv|xlsx, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Configuration for one cleaning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CleanOptions {
    /// Header names to keep (required, matched case-insensitively)
    #[validate(length(min = 1, message = "No columns provided"))]
    pub columns: Vec<String>,

    /// Strip leading and trailing whitespace (default: true)
    pub trim: bool,

    /// Collapse internal whitespace runs to one space (default: true)
    pub collapse_spaces: bool,

    /// Case transform (default: none)
    pub text_case: TextCase,

    /// Date rewriting (default: none)
    pub date_format: DateFormat,

    /// Composite dedupe key; empty disables dedupe
    pub dedupe_keys: Vec<String>,

    /// Drop rows whose kept cells are all blank (default: true)
    pub drop_empty_rows: bool,

    /// Drop kept columns whose cells are all blank (default: true)
    pub drop_empty_cols: bool,

    /// Canonicalize numbers and booleans (default: false)
    pub normalize_types: bool,

    pub validate_email: bool,
    pub remove_invalid_emails: bool,
    pub validate_url: bool,
    pub remove_invalid_urls: bool,

    /// Encoding of the cleaned file (default: csv)
    pub output_format: OutputFormat,

    /// Keep the source header order instead of the selection order (default: true)
    pub keep_order: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            trim: true,
            collapse_spaces: true,
            text_case: TextCase::None,
            date_format: DateFormat::None,
            dedupe_keys: Vec::new(),
            drop_empty_rows: true,
            drop_empty_cols: true,
            normalize_types: false,
            validate_email: false,
            remove_invalid_emails: false,
            validate_url: false,
            remove_invalid_urls: false,
            output_format: OutputFormat::Csv,
            keep_order: true,
        }
    }
}

impl CleanOptions {
    /// Defaults with the given column selection
    pub fn with_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    /// Split a comma-joined list, dropping blank tokens
    pub fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validate option values before any stage runs
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if self.columns.iter().all(|column| column.trim().is_empty()) {
            return Err(AppError::ValidationError("No columns provided".to_string()));
        }
        Ok(())
    }

    pub fn field_transforms(&self) -> FieldTransformOptions {
        FieldTransformOptions {
            trim: self.trim,
            collapse_spaces: self.collapse_spaces,
            text_case: self.text_case,
            date_format: self.date_format,
            normalize_types: self.normalize_types,
        }
    }

    pub fn column_filter(&self) -> ColumnFilterOptions<'_> {
        ColumnFilterOptions {
            columns: &self.columns,
            keep_order: self.keep_order,
            drop_empty_cols: self.drop_empty_cols,
            drop_empty_rows: self.drop_empty_rows,
        }
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            validate_email: self.validate_email,
            remove_invalid_emails: self.remove_invalid_emails,
            validate_url: self.validate_url,
            remove_invalid_urls: self.remove_invalid_urls,
        }
    }

    pub fn dedupe(&self) -> DedupeOptions<'_> {
        DedupeOptions {
            keys: &self.dedupe_keys,
        }
    }
}

/// Options read by the field transform pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldTransformOptions {
    pub trim: bool,
    pub collapse_spaces: bool,
    pub text_case: TextCase,
    pub date_format: DateFormat,
    pub normalize_types: bool,
}

impl FieldTransformOptions {
    pub fn is_noop(&self) -> bool {
        !self.trim
            && !self.collapse_spaces
            && self.text_case == TextCase::None
            && self.date_format == DateFormat::None
            && !self.normalize_types
    }
}

/// Options read by column projection and empty row/column elision
#[derive(Debug, Clone, Copy)]
pub struct ColumnFilterOptions<'a> {
    pub columns: &'a [String],
    pub keep_order: bool,
    pub drop_empty_cols: bool,
    pub drop_empty_rows: bool,
}

/// Email/URL checks and whether failures remove the row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationRules {
    pub validate_email: bool,
    pub remove_invalid_emails: bool,
    pub validate_url: bool,
    pub remove_invalid_urls: bool,
}

impl ValidationRules {
    pub fn enforce_email(&self) -> bool {
        self.validate_email && self.remove_invalid_emails
    }

    pub fn enforce_url(&self) -> bool {
        self.validate_url && self.remove_invalid_urls
    }

    pub fn is_active(&self) -> bool {
        self.validate_email || self.validate_url
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DedupeOptions<'a> {
    pub keys: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_defaults() {
        let options = CleanOptions::default();
        assert!(options.trim);
        assert!(options.collapse_spaces);
        assert!(options.drop_empty_rows);
        assert!(options.drop_empty_cols);
        assert!(options.keep_order);
        assert!(!options.normalize_types);
        assert_eq!(options.output_format, OutputFormat::Csv);
    }

    #[test]
    fn test_check_requires_columns() {
        let err = CleanOptions::default().check().unwrap_err();
        assert_eq!(err, AppError::ValidationError("No columns provided".to_string()));

        let blank = CleanOptions::with_columns(&["  "]);
        assert!(blank.check().is_err());

        assert!(CleanOptions::with_columns(&["Name"]).check().is_ok());
    }

    #[test]
    fn test_parse_list_drops_blank_tokens() {
        assert_eq!(
            CleanOptions::parse_list(" Name, ,Email ,"),
            vec!["Name".to_string(), "Email".to_string()]
        );
        assert!(CleanOptions::parse_list("").is_empty());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("TITLE".parse::<TextCase>().unwrap(), TextCase::Title);
        assert_eq!("iso".parse::<DateFormat>().unwrap(), DateFormat::Iso);
        assert_eq!("Xlsx".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert!("camel".parse::<TextCase>().is_err());
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_validation_rules_enforcement() {
        let rules = ValidationRules {
            validate_email: false,
            remove_invalid_emails: true,
            validate_url: true,
            remove_invalid_urls: true,
        };
        assert!(!rules.enforce_email());
        assert!(rules.enforce_url());
        assert!(rules.is_active());
    }
}
