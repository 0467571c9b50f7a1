//! Natural-language equity research pipeline
//!
//! Turns free-text questions ("show me large semiconductor companies")
//! into structured search criteria, fetches and normalizes market data
//! for a fixed instrument universe, matches instruments against the
//! criteria, and optionally annotates the matches with model-generated
//! commentary.
//!
//! The main entry point is [`ResearchPipeline`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use scout_core::{ResearchPipeline, ScoutConfig, YahooMarketData};
//! use scout_llm::OpenAiCompatProvider;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let llm = Arc::new(OpenAiCompatProvider::from_env()?);
//! let provider = Arc::new(YahooMarketData::new()?);
//! let pipeline = ResearchPipeline::new(llm, provider, ScoutConfig::default());
//!
//! let result = pipeline.process_query("tech stocks over 500 billion", false).await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```
//!
//! Failure philosophy: the query surface never propagates errors. A
//! symbol that cannot be fetched becomes an error record, a model that
//! cannot be reached triggers the deterministic keyword fallback, and
//! anything else collapses into a query-level error envelope.

pub mod annotator;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod error;
pub mod gateway;
pub mod interpreter;
pub mod matcher;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod retry;
pub mod snapshot;

pub use annotator::AnalysisAnnotator;
pub use batch::{BatchCoordinator, NoopSink, PersistenceSink};
pub use catalog::{InstrumentCatalog, InstrumentMetadata};
pub use config::{ScoutConfig, ScoutConfigBuilder};
pub use criteria::{SearchCriteria, SortKey, SortOrder};
pub use error::{ProviderError, Result, ScoutError};
pub use gateway::MarketDataGateway;
pub use interpreter::{Interpretation, QueryInterpreter};
pub use matcher::{MAX_RESULTS, MatchingEngine};
pub use pipeline::ResearchPipeline;
pub use provider::{MarketDataProvider, SessionBar, SummaryMetrics, YahooMarketData};
pub use retry::RetryPolicy;
pub use snapshot::{
    AnalysisBlock, BatchOutcome, HistoricalSeries, MatchResult, QuoteSnapshot, format_market_cap,
};
