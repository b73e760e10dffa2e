// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Core types and value objects for the cleaning engine
// No I/O, no async

mod clean_options;
mod clean_report;
mod data_table;
mod files;
mod pipeline_stage;

pub use clean_options::{
    CleanOptions, ColumnFilterOptions, DateFormat, DedupeOptions, FieldTransformOptions,
    OutputFormat, TextCase, ValidationRules,
};
pub use clean_report::CleanReport;
pub use data_table::{is_row_blank, normalize_name, Row, Table};
pub use files::{CleanedFile, InputFormat, UploadedFile};
pub use pipeline_stage::{CleanError, PipelineStage, PipelineState};
