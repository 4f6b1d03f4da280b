//! Generation — the only node that leaves the process.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use parley_core::{ChatError, ChatResult, epoch_now};
use parley_llm::cache::{cache_key, key_digest};
use parley_llm::{ModelClient, ResponseCache, TokenTiming};
use parley_telemetry::UnitHandle;

use crate::node::Node;
use crate::state::PipelineState;

/// Calls the model client, memoizing through the response cache.
///
/// Cache hits report zero token timing; misses report *estimated* timing
/// derived from the call duration (see [`TokenTiming`]). A client failure
/// propagates as a generation error — never a silent default response.
pub struct Generate {
    client: Arc<dyn ModelClient>,
    cache: Arc<ResponseCache>,
}

impl Generate {
    /// New generate node over a client and a shared cache.
    pub fn new(client: Arc<dyn ModelClient>, cache: Arc<ResponseCache>) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Node for Generate {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn operation_type(&self) -> &'static str {
        "generation"
    }

    async fn run(&self, mut state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState> {
        let messages = state.messages()?;
        let key = cache_key(messages);

        span.set("model", json!(self.client.model()));
        span.set("cache_key_hash", json!(key_digest(&key)));

        let (completion, timing, hit) = if let Some(cached) = self.cache.get(&key) {
            debug!(cache_key_hash = %key_digest(&key), "response cache hit");
            metrics::counter!("response_cache_hits_total").increment(1);
            (cached, TokenTiming::zero(), true)
        } else {
            metrics::counter!("response_cache_misses_total").increment(1);
            let started = Instant::now();
            let completion = self
                .client
                .complete(messages)
                .await
                .map_err(|e| ChatError::generation(e.to_string()))?;
            let timing = TokenTiming::estimate(started.elapsed());
            let _ = self.cache.insert(key, completion.clone());
            (completion, timing, false)
        };

        span.set("cache_hit", json!(hit));
        span.set("response_length", json!(completion.text.len()));
        span.set("usage", json!(completion.usage));
        span.set("time_to_first_token_ms", json!(timing.time_to_first_token_ms));
        span.set("time_to_last_token_ms", json!(timing.time_to_last_token_ms));

        state.usage = Some(completion.usage);
        state.generated_response = Some(completion.text);
        state.generation_timestamp = Some(epoch_now());
        state.token_timing = Some(timing);
        state.cache_hit = Some(hit);
        Ok(state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
