//! Response postprocessing.

use async_trait::async_trait;
use serde_json::json;

use parley_core::ChatResult;
use parley_telemetry::UnitHandle;

use crate::node::Node;
use crate::state::{PipelineState, ResponseMetadata};

/// Trims the generated text and attaches word/char metadata.
pub struct Postprocess;

#[async_trait]
impl Node for Postprocess {
    fn name(&self) -> &'static str {
        "postprocess"
    }

    fn operation_type(&self) -> &'static str {
        "postprocessing"
    }

    async fn run(&self, mut state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState> {
        let processed = state.generated_response()?.trim().to_owned();
        let metadata = ResponseMetadata::for_text(&processed);

        span.set("processed_response_length", json!(processed.len()));
        span.set("word_count", json!(metadata.word_count));

        state.processed_response = Some(processed);
        state.response_metadata = Some(metadata);
        Ok(state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
