// ============================================================
// UPLOADED AND CLEANED FILES
// ============================================================

use serde::Serialize;

use super::{CleanReport, OutputFormat};
use crate::domain::error::{AppError, Result};

/// Declared format of an upload, decided before any byte is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    /// XLSX or legacy XLS; the decoder tells them apart by magic bytes
    Spreadsheet,
}

/// A file as received from the client
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Detect the format from the file name first, then from the MIME type
    pub fn input_format(&self) -> Result<InputFormat> {
        if let Some(name) = &self.file_name {
            let lower = name.trim().to_lowercase();
            if lower.ends_with(".csv") {
                return Ok(InputFormat::Csv);
            }
            if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
                return Ok(InputFormat::Spreadsheet);
            }
        }

        if let Some(mime) = &self.content_type {
            let lower = mime.to_lowercase();
            if lower.contains("csv") {
                return Ok(InputFormat::Csv);
            }
            if lower.contains("sheet") || lower.contains("excel") {
                return Ok(InputFormat::Spreadsheet);
            }
        }

        Err(AppError::FormatError("Unsupported file type".to_string()))
    }

    /// Name of the upload without a trailing .csv/.xlsx/.xls extension
    pub fn base_name(&self) -> String {
        let name = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("file");
        // Browsers on some platforms send the full client path
        let name = name.rsplit(['/', '\\']).next().unwrap_or(name);

        let lower = name.to_lowercase();
        for ext in [".xlsx", ".xls", ".csv"] {
            if lower.ends_with(ext) && name.len() > ext.len() {
                if let Some(stem) = name.get(..name.len() - ext.len()) {
                    return stem.to_string();
                }
            }
        }
        name.to_string()
    }

    /// `cleaned_<base>.<ext>` for the chosen output format
    pub fn cleaned_file_name(&self, format: OutputFormat) -> String {
        format!("cleaned_{}.{}", self.base_name(), format.extension())
    }
}

/// Encoded result returned to the caller
#[derive(Debug, Clone)]
pub struct CleanedFile {
    pub file_name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub report: CleanReport,
}

impl CleanedFile {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
