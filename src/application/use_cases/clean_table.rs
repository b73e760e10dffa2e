// ============================================================
// CLEAN TABLE USE CASE
// ============================================================
// Decode -> transform -> filter -> deduplicate -> encode, one request at a time

use std::time::Instant;

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::column_filter::ColumnFilter;
use super::deduplicator::Deduplicator;
use super::field_transform::FieldTransformer;
use crate::domain::error::AppError;
use crate::domain::table::{
    CleanError, CleanOptions, CleanReport, CleanedFile, PipelineStage, PipelineState,
    UploadedFile,
};
use crate::infrastructure::tabular::{decode_table, encode_table};

pub type CleanResult<T> = std::result::Result<T, CleanError>;

/// Stateless cleaning engine; safe to share across threads
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanTableUseCase;

impl CleanTableUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Clean an uploaded file. Any failure discards the table; no partial output.
    pub fn execute(&self, upload: &UploadedFile, options: &CleanOptions) -> CleanResult<CleanedFile> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "clean",
            %request_id,
            file = upload.file_name.as_deref().unwrap_or("file"),
            bytes = upload.bytes.len()
        );
        let _entered = span.enter();
        let start = Instant::now();

        let mut run = PipelineRun::new();
        let result = run.execute(upload, options);

        match &result {
            Ok(cleaned) => info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                output = %cleaned.file_name,
                "Cleaning complete: {}",
                cleaned.report.summary()
            ),
            Err(err) => {
                run.fail(err);
                warn!(
                    stage = %err.stage,
                    kind = err.error.kind(),
                    "Cleaning failed: {}",
                    err.error
                );
            }
        }

        result
    }

    /// Decode an upload and return its cleaned header list
    pub fn read_headers(&self, upload: &UploadedFile) -> CleanResult<Vec<String>> {
        let format = upload
            .input_format()
            .map_err(|e| CleanError::new(PipelineStage::Receive, e))?;
        let table =
            decode_table(format, &upload.bytes).map_err(|e| CleanError::new(PipelineStage::Decode, e))?;
        debug!(columns = table.width(), "Read headers");
        Ok(table.headers)
    }
}

/// Tracks the state machine of one request
struct PipelineRun {
    state: PipelineState,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            state: PipelineState::Received,
        }
    }

    fn execute(&mut self, upload: &UploadedFile, options: &CleanOptions) -> CleanResult<CleanedFile> {
        options.check().map_err(at(PipelineStage::Receive))?;
        let format = upload.input_format().map_err(at(PipelineStage::Receive))?;

        let mut table = decode_table(format, &upload.bytes).map_err(at(PipelineStage::Decode))?;
        self.advance(PipelineStage::Decode);
        let mut report = CleanReport {
            rows_in: table.row_count(),
            columns_in: table.width(),
            ..Default::default()
        };

        FieldTransformer::new(options.field_transforms()).apply(&mut table);
        self.advance(PipelineStage::Transform);

        // Keys may name columns the selection drops
        let dedupe = Deduplicator::new(options.dedupe());
        dedupe.attach_keys(&mut table);
        ColumnFilter::new(options.column_filter(), options.validation_rules())
            .apply(&mut table, &mut report);
        self.advance(PipelineStage::Filter);

        report.duplicates_removed = dedupe.apply(&mut table);
        self.advance(PipelineStage::Deduplicate);

        report.rows_out = table.row_count();
        report.columns_out = table.width();
        let bytes = encode_table(options.output_format, &table).map_err(at(PipelineStage::Encode))?;
        self.advance(PipelineStage::Encode);

        self.state = PipelineState::Done;
        Ok(CleanedFile {
            file_name: upload.cleaned_file_name(options.output_format),
            format: options.output_format,
            bytes,
            report,
        })
    }

    fn advance(&mut self, stage: PipelineStage) {
        debug_assert_eq!(self.state.next_stage(), Some(stage));
        self.state = PipelineState::after(stage);
        debug!(state = ?self.state, "Stage {} finished", stage);
    }

    fn fail(&mut self, err: &CleanError) {
        self.state = err.state();
        debug!(state = ?self.state, "Pipeline failed");
    }
}

fn at(stage: PipelineStage) -> impl Fn(AppError) -> CleanError {
    move |error| CleanError::new(stage, error)
}
