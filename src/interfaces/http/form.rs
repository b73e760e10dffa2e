use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::application::use_cases::type_normalizer::parse_boolean;
use crate::domain::error::{AppError, Result};
use crate::domain::table::{CleanOptions, UploadedFile};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// A fully buffered multipart request: the upload plus every text field
#[derive(Debug, Default)]
pub struct CleanForm {
    pub upload: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl CleanForm {
    /// Stream the multipart body, failing once more than `limit` bytes were received
    pub async fn read(mut payload: Multipart, limit: usize) -> Result<Self> {
        let mut form = CleanForm::default();
        let mut received = 0usize;

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| {
                AppError::TransportError(format!("Failed to read multipart field: {}", e))
            })?;
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    AppError::TransportError(format!("Failed to read field '{}': {}", name, e))
                })?;
                received += chunk.len();
                if received > limit {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Upload exceeds {} bytes",
                        limit
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            if name == FILE_FIELD {
                form.upload = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = String::from_utf8(bytes).map_err(|_| {
                    AppError::ValidationError(format!("Field '{}' is not valid UTF-8", name))
                })?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn take_upload(&mut self) -> Result<UploadedFile> {
        self.upload
            .take()
            .ok_or_else(|| AppError::ValidationError("No file uploaded".to_string()))
    }

    /// Build options from the text fields; absent fields keep their defaults
    pub fn options(&self) -> Result<CleanOptions> {
        let defaults = CleanOptions::default();
        Ok(CleanOptions {
            columns: self.list("columns"),
            trim: self.flag("trim", defaults.trim)?,
            collapse_spaces: self.flag("collapseSpaces", defaults.collapse_spaces)?,
            text_case: self.text("textCase").parse()?,
            date_format: self.text("dateFormat").parse()?,
            dedupe_keys: self.list("dedupeKeys"),
            drop_empty_rows: self.flag("dropEmptyRows", defaults.drop_empty_rows)?,
            drop_empty_cols: self.flag("dropEmptyCols", defaults.drop_empty_cols)?,
            normalize_types: self.flag("normalizeTypes", defaults.normalize_types)?,
            validate_email: self.flag("validateEmail", defaults.validate_email)?,
            remove_invalid_emails: self
                .flag("removeInvalidEmails", defaults.remove_invalid_emails)?,
            validate_url: self.flag("validateUrl", defaults.validate_url)?,
            remove_invalid_urls: self.flag("removeInvalidUrls", defaults.remove_invalid_urls)?,
            output_format: self.text("outputFormat").parse()?,
            keep_order: self.flag("keepOrder", defaults.keep_order)?,
        })
    }

    fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    fn list(&self, name: &str) -> Vec<String> {
        CleanOptions::parse_list(self.text(name))
    }

    fn flag(&self, name: &str, default: bool) -> Result<bool> {
        parse_flag(name, self.text(name), default)
    }
}

/// Form checkbox value; blank means "not sent"
pub fn parse_flag(name: &str, value: &str, default: bool) -> Result<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    if let Some(flag) = parse_boolean(value) {
        return Ok(flag);
    }
    match value.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(AppError::ValidationError(format!(
            "{} must be true|false|1|0|on|off|yes|no, got '{}'",
            name, value
        ))),
    }
}
