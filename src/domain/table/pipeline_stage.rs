// ============================================================
// PIPELINE STAGES
// ============================================================
// Strictly sequential state machine for one cleaning request

use serde::Serialize;
use std::fmt;

use crate::domain::error::AppError;

/// Stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Receive,
    Decode,
    Transform,
    Filter,
    Deduplicate,
    Encode,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Receive => "receive",
            PipelineStage::Decode => "decode",
            PipelineStage::Transform => "transform",
            PipelineStage::Filter => "filter",
            PipelineStage::Deduplicate => "deduplicate",
            PipelineStage::Encode => "encode",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a request currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    Decoded,
    Transformed,
    Filtered,
    Deduplicated,
    Encoded,
    Done,
    Failed {
        stage: PipelineStage,
        kind: &'static str,
    },
}

impl PipelineState {
    /// The stage that runs when leaving this state, `None` once terminal
    pub fn next_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineState::Received => Some(PipelineStage::Decode),
            PipelineState::Decoded => Some(PipelineStage::Transform),
            PipelineState::Transformed => Some(PipelineStage::Filter),
            PipelineState::Filtered => Some(PipelineStage::Deduplicate),
            PipelineState::Deduplicated => Some(PipelineStage::Encode),
            PipelineState::Encoded | PipelineState::Done | PipelineState::Failed { .. } => None,
        }
    }

    /// State reached when `stage` succeeds
    pub fn after(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Receive => PipelineState::Received,
            PipelineStage::Decode => PipelineState::Decoded,
            PipelineStage::Transform => PipelineState::Transformed,
            PipelineStage::Filter => PipelineState::Filtered,
            PipelineStage::Deduplicate => PipelineState::Deduplicated,
            PipelineStage::Encode => PipelineState::Encoded,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }
}

/// A failed request: the stage it failed in and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanError {
    pub stage: PipelineStage,
    pub error: AppError,
}

impl CleanError {
    pub fn new(stage: PipelineStage, error: AppError) -> Self {
        Self { stage, error }
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::Failed {
            stage: self.stage,
            kind: self.error.kind(),
        }
    }
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for CleanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_advance_in_order() {
        let mut state = PipelineState::Received;
        let mut visited = Vec::new();
        while let Some(stage) = state.next_stage() {
            visited.push(stage);
            state = PipelineState::after(stage);
        }

        assert_eq!(
            visited,
            vec![
                PipelineStage::Decode,
                PipelineStage::Transform,
                PipelineStage::Filter,
                PipelineStage::Deduplicate,
                PipelineStage::Encode,
            ]
        );
        assert_eq!(state, PipelineState::Encoded);
    }

    #[test]
    fn test_clean_error_display_names_stage() {
        let err = CleanError::new(
            PipelineStage::Decode,
            AppError::FormatError("file has no rows".to_string()),
        );
        assert_eq!(err.to_string(), "decode failed: Format error: file has no rows");
        assert_eq!(
            err.state(),
            PipelineState::Failed {
                stage: PipelineStage::Decode,
                kind: "format"
            }
        );
        assert!(err.state().is_terminal());
    }
}
