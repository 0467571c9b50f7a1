//! Model-backed qualitative annotation of quote snapshots
//!
//! Annotation is strictly additive: a snapshot goes in with numeric
//! fields populated and comes back with an [`AnalysisBlock`] attached.
//! Model failures of any kind degrade to a placeholder block rather
//! than dropping the instrument.

use std::sync::Arc;

use scout_llm::{ChatRequest, LlmProvider};
use tracing::{debug, warn};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::interpreter::extract_json_fragment;
use crate::prompts;
use crate::snapshot::{AnalysisBlock, QuoteSnapshot};

/// Attaches qualitative analysis to snapshots
pub struct AnalysisAnnotator {
    llm: Arc<dyn LlmProvider>,
    config: Arc<ScoutConfig>,
}

impl AnalysisAnnotator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: Arc<ScoutConfig>) -> Self {
        Self { llm, config }
    }

    /// Annotate one snapshot
    ///
    /// Never fails and never mutates numeric fields: when the model is
    /// unreachable or its output is unusable, the snapshot carries
    /// [`AnalysisBlock::unavailable`] instead.
    pub async fn annotate(&self, snapshot: QuoteSnapshot) -> QuoteSnapshot {
        if snapshot.is_error() {
            return snapshot;
        }

        let analysis = match self.request_analysis(&snapshot).await {
            Ok(block) => {
                debug!("Generated analysis for {}", snapshot.symbol);
                block
            }
            Err(e) => {
                warn!("Analysis for {} unavailable: {}", snapshot.symbol, e);
                AnalysisBlock::unavailable()
            }
        };

        snapshot.with_analysis(analysis)
    }

    async fn request_analysis(&self, snapshot: &QuoteSnapshot) -> Result<AnalysisBlock> {
        let request = ChatRequest::builder(&self.config.model)
            .system(prompts::ANALYSIS_SYSTEM_PROMPT)
            .prompt(prompts::analysis_prompt(snapshot))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = self.llm.complete(request).await?;
        parse_analysis(&response.text)
    }
}

/// Parse model output into an analysis block
///
/// Same recovery strategy as query interpretation: whole text first,
/// then the outermost embedded JSON object. Missing fields fall back
/// to their serde defaults rather than failing the parse.
fn parse_analysis(text: &str) -> Result<AnalysisBlock> {
    let trimmed = text.trim();

    if let Ok(block) = serde_json::from_str::<AnalysisBlock>(trimmed) {
        return Ok(block);
    }

    let fragment = extract_json_fragment(trimmed)
        .ok_or_else(|| ScoutError::Parse("no JSON object in model output".to_string()))?;

    serde_json::from_str::<AnalysisBlock>(fragment)
        .map_err(|e| ScoutError::Parse(format!("embedded JSON did not parse: {e}")))
}
