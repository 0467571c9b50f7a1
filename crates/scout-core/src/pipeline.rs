//! End-to-end research pipeline
//!
//! Wires interpretation, bounded fetching, matching, and annotation
//! into one façade. The pipeline's query surface is infallible: any
//! failure that escapes the inner stages becomes a query-level error
//! envelope rather than a propagated `Err`.

use std::sync::Arc;

use futures::future::join_all;
use scout_llm::LlmProvider;
use tracing::{error, info};

use crate::annotator::AnalysisAnnotator;
use crate::batch::{BatchCoordinator, PersistenceSink};
use crate::catalog::InstrumentCatalog;
use crate::config::ScoutConfig;
use crate::error::Result;
use crate::gateway::MarketDataGateway;
use crate::interpreter::{Interpretation, QueryInterpreter};
use crate::matcher::MatchingEngine;
use crate::provider::MarketDataProvider;
use crate::retry::RetryPolicy;
use crate::snapshot::{BatchOutcome, MatchResult, QuoteSnapshot};

/// Natural-language equity research pipeline
pub struct ResearchPipeline {
    interpreter: QueryInterpreter,
    coordinator: BatchCoordinator,
    gateway: Arc<MarketDataGateway>,
    annotator: AnalysisAnnotator,
    catalog: Arc<InstrumentCatalog>,
    config: Arc<ScoutConfig>,
}

impl ResearchPipeline {
    /// Assemble a pipeline over the given model and market-data provider
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        provider: Arc<dyn MarketDataProvider>,
        config: ScoutConfig,
    ) -> Self {
        Self::with_catalog(llm, provider, config, InstrumentCatalog::default_universe())
    }

    /// Assemble a pipeline over a custom instrument universe
    pub fn with_catalog(
        llm: Arc<dyn LlmProvider>,
        provider: Arc<dyn MarketDataProvider>,
        config: ScoutConfig,
        catalog: InstrumentCatalog,
    ) -> Self {
        let config = Arc::new(config);
        let catalog = Arc::new(catalog);

        let retry = RetryPolicy::new(
            config.max_retries,
            config.retry_delay,
            config.retry_delay,
            1.0,
        );
        let gateway = Arc::new(MarketDataGateway::new(provider, retry));

        Self {
            interpreter: QueryInterpreter::new(llm.clone(), catalog.clone(), config.clone()),
            coordinator: BatchCoordinator::new(gateway.clone(), config.clone()),
            annotator: AnalysisAnnotator::new(llm, config.clone()),
            gateway,
            catalog,
            config,
        }
    }

    /// Answer one natural-language query
    ///
    /// Always returns an envelope: matched instruments on success, an
    /// `error`-carrying envelope when processing itself breaks down.
    pub async fn process_query(&self, query: &str, include_historical: bool) -> MatchResult {
        match self.run_query(query, include_historical).await {
            Ok(result) => result,
            Err(e) => {
                error!("Query '{}' failed: {}", query, e);
                MatchResult::error(query, format!("Error processing query: {e}"))
            }
        }
    }

    async fn run_query(&self, query: &str, include_historical: bool) -> Result<MatchResult> {
        match self.interpreter.interpret(query).await {
            Interpretation::SymbolLookup(symbol) => {
                info!("Direct symbol lookup: {}", symbol);
                let snapshot = self.fetch_symbol_details(&symbol, include_historical).await;
                Ok(MatchResult::new(
                    query,
                    format!("Direct lookup of {symbol}"),
                    vec![snapshot],
                ))
            }
            Interpretation::Criteria(criteria) => {
                let interpreted_as = if criteria.description.is_empty() {
                    serde_json::to_string(&criteria)?
                } else {
                    criteria.description.clone()
                };
                info!("Interpreted query as: {}", interpreted_as);

                let fetched = self
                    .coordinator
                    .fetch_all(self.catalog.symbols(), include_historical)
                    .await;

                // Failed fetches never reach the matching engine
                let candidates: Vec<QuoteSnapshot> = fetched
                    .into_iter()
                    .filter(|s| !s.is_error())
                    .map(|s| self.merge_metadata(s))
                    .collect();

                let matched = MatchingEngine::apply(candidates, &criteria);
                info!("Matched {} instruments", matched.len());

                let results = self.annotate_all(matched).await;
                Ok(MatchResult::new(query, interpreted_as, results))
            }
        }
    }

    /// Fetch, enrich, and annotate a single instrument
    pub async fn fetch_symbol_details(
        &self,
        symbol: &str,
        include_historical: bool,
    ) -> QuoteSnapshot {
        let snapshot = self
            .gateway
            .fetch(symbol, include_historical, self.config.historical_days)
            .await;
        let snapshot = self.merge_metadata(snapshot);

        if self.config.annotate_results {
            self.annotator.annotate(snapshot).await
        } else {
            snapshot
        }
    }

    /// Bulk-process symbols into a persistence sink
    pub async fn process_batch(
        &self,
        symbols: &[String],
        sink: &dyn PersistenceSink,
    ) -> BatchOutcome {
        self.coordinator.process_all(symbols, sink).await
    }

    /// The instrument universe this pipeline searches over
    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    fn merge_metadata(&self, snapshot: QuoteSnapshot) -> QuoteSnapshot {
        if snapshot.is_error() {
            return snapshot;
        }
        match self.catalog.get(&snapshot.symbol) {
            Some(meta) => snapshot.with_metadata(meta),
            None => snapshot,
        }
    }

    async fn annotate_all(&self, snapshots: Vec<QuoteSnapshot>) -> Vec<QuoteSnapshot> {
        if !self.config.annotate_results {
            return snapshots;
        }
        join_all(snapshots.into_iter().map(|s| self.annotator.annotate(s))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstrumentMetadata;
    use crate::error::ProviderError;
    use crate::provider::{SessionBar, SummaryMetrics};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use scout_llm::{ChatRequest, ChatResponse, LlmError, TokenUsage};

    struct ScriptedLlm {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, _request: ChatRequest) -> scout_llm::Result<ChatResponse> {
            match &self.reply {
                Some(text) => Ok(ChatResponse {
                    text: text.clone(),
                    usage: TokenUsage::default(),
                }),
                None => Err(LlmError::RequestFailed("scripted failure".to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FakeProvider;

    #[async_trait]
    impl crate::provider::MarketDataProvider for FakeProvider {
        async fn latest_session(
            &self,
            symbol: &str,
        ) -> std::result::Result<SessionBar, ProviderError> {
            if symbol == "FAIL" {
                return Err(ProviderError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            // Deterministic per-symbol close so sorting is observable
            let close = 100.0 + f64::from(symbol.len() as u32);
            Ok(SessionBar {
                open: 100.0,
                high: close + 1.0,
                low: 99.0,
                close,
                volume: 10_000,
            })
        }

        async fn history(
            &self,
            _symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> std::result::Result<Vec<(NaiveDate, f64)>, ProviderError> {
            Ok(Vec::new())
        }

        async fn summary(
            &self,
            _symbol: &str,
        ) -> std::result::Result<SummaryMetrics, ProviderError> {
            Ok(SummaryMetrics { market_cap: None })
        }
    }

    fn test_catalog() -> InstrumentCatalog {
        let mk = |symbol: &str, name: &str, sector: &str, industry: &str| InstrumentMetadata {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
        };
        InstrumentCatalog::new(vec![
            mk("NVDA", "NVIDIA Corporation", "Technology", "Semiconductors"),
            mk("DUK", "Duke Energy Corporation", "Energy", "Utilities"),
            mk("FAIL", "Failing Instrument", "Technology", "Software"),
        ])
    }

    fn pipeline(llm_reply: Option<&str>) -> ResearchPipeline {
        let config = ScoutConfig::builder()
            .max_retries(1)
            .annotate_results(false)
            .build()
            .unwrap();

        ResearchPipeline::with_catalog(
            Arc::new(ScriptedLlm {
                reply: llm_reply.map(String::from),
            }),
            Arc::new(FakeProvider),
            config,
            test_catalog(),
        )
    }

    #[tokio::test]
    async fn test_exact_symbol_bypasses_interpretation() {
        // The model is down, but a catalog symbol never consults it
        let result = pipeline(None).process_query("nvda", false).await;

        assert!(result.error.is_none());
        assert_eq!(result.results_count, 1);
        assert_eq!(result.results[0].symbol, "NVDA");
        assert_eq!(result.results[0].name.as_deref(), Some("NVIDIA Corporation"));
    }

    #[tokio::test]
    async fn test_criteria_path_drops_failed_fetches() {
        let result = pipeline(Some("{}")).process_query("everything", false).await;

        assert!(result.error.is_none());
        assert_eq!(result.results_count, 2);
        assert!(result.results.iter().all(|r| !r.is_error()));
        assert!(result.results.iter().all(|r| r.symbol != "FAIL"));
    }

    #[tokio::test]
    async fn test_sector_criteria_filters_universe() {
        let reply = r#"{"sectors": ["Energy"], "description": "Energy companies"}"#;
        let result = pipeline(Some(reply)).process_query("energy stocks", false).await;

        assert_eq!(result.interpreted_as, "Energy companies");
        assert_eq!(result.results_count, 1);
        assert_eq!(result.results[0].symbol, "DUK");
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_keywords() {
        // "energy" maps onto the Energy sector in the keyword tables
        let result = pipeline(None).process_query("energy companies", false).await;

        assert!(result.error.is_none());
        assert_eq!(result.results_count, 1);
        assert_eq!(result.results[0].symbol, "DUK");
    }

    #[tokio::test]
    async fn test_symbol_lookup_of_failing_instrument_returns_error_record() {
        let result = pipeline(None).process_query("FAIL", false).await;

        assert_eq!(result.results_count, 1);
        assert!(result.results[0].is_error());
        assert_eq!(
            result.results[0].error.as_deref(),
            Some("No data available for FAIL")
        );
    }
}
