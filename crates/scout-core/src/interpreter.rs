//! Query interpretation
//!
//! Turns a free-text query into structured [`SearchCriteria`], using the
//! language model first and a deterministic keyword pass whenever the
//! model call or its output cannot be trusted. A query that is exactly a
//! catalog symbol bypasses interpretation entirely.

use std::sync::Arc;

use scout_llm::{ChatRequest, LlmProvider};
use tracing::{debug, warn};

use crate::catalog::InstrumentCatalog;
use crate::config::ScoutConfig;
use crate::criteria::SearchCriteria;
use crate::error::{Result, ScoutError};
use crate::prompts;

/// Keyword -> category tables for the deterministic fallback
mod keywords {
    pub const SECTORS: &[(&str, &str)] = &[
        ("tech", "Technology"),
        ("technology", "Technology"),
        ("finance", "Finance"),
        ("financial", "Finance"),
        ("energy", "Energy"),
        ("real estate", "Real Estate"),
    ];

    pub const INDUSTRIES: &[(&str, &str)] = &[
        ("semiconductor", "Semiconductors"),
        ("software", "Software"),
        ("banking", "Banking"),
        ("data center", "Data Centers"),
    ];
}

/// Outcome of interpreting one query
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The query is exactly a known symbol; treat as a detail request
    SymbolLookup(String),
    /// Structured criteria, from the model or the fallback
    Criteria(SearchCriteria),
}

/// Converts free-text queries into search criteria
pub struct QueryInterpreter {
    llm: Arc<dyn LlmProvider>,
    catalog: Arc<InstrumentCatalog>,
    config: Arc<ScoutConfig>,
}

impl QueryInterpreter {
    /// Create a new interpreter
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        catalog: Arc<InstrumentCatalog>,
        config: Arc<ScoutConfig>,
    ) -> Self {
        Self {
            llm,
            catalog,
            config,
        }
    }

    /// Interpret a query
    ///
    /// Never fails: model trouble of any kind lands in the keyword
    /// fallback.
    pub async fn interpret(&self, query: &str) -> Interpretation {
        let trimmed = query.trim();

        let upper = trimmed.to_uppercase();
        if self.catalog.contains(&upper) {
            debug!("Query '{}' is an exact symbol, bypassing interpretation", trimmed);
            return Interpretation::SymbolLookup(upper);
        }

        match self.interpret_with_model(trimmed).await {
            Ok(criteria) => Interpretation::Criteria(criteria),
            Err(e) => {
                warn!("Model interpretation failed ({}), using keyword fallback", e);
                Interpretation::Criteria(fallback_criteria(trimmed))
            }
        }
    }

    async fn interpret_with_model(&self, query: &str) -> Result<SearchCriteria> {
        let request = ChatRequest::builder(&self.config.model)
            .system(prompts::INTERPRET_SYSTEM_PROMPT)
            .prompt(prompts::interpret_prompt(query))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = self.llm.complete(request).await?;
        parse_criteria(&response.text)
    }
}

/// Parse model output into criteria
///
/// Tries the whole text as JSON first; if that fails, attempts to
/// recover a single JSON object embedded in surrounding chatter.
pub(crate) fn parse_criteria(text: &str) -> Result<SearchCriteria> {
    let trimmed = text.trim();

    if let Ok(criteria) = serde_json::from_str::<SearchCriteria>(trimmed) {
        return Ok(criteria);
    }

    let fragment = extract_json_fragment(trimmed)
        .ok_or_else(|| ScoutError::Parse("no JSON object in model output".to_string()))?;

    serde_json::from_str::<SearchCriteria>(fragment)
        .map_err(|e| ScoutError::Parse(format!("embedded JSON did not parse: {e}")))
}

/// Slice out the outermost `{...}` span, if any
pub(crate) fn extract_json_fragment(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Deterministic keyword interpretation
///
/// Substring-matches the query against fixed sector and industry
/// tables; everything the query says becomes keywords verbatim.
pub(crate) fn fallback_criteria(query: &str) -> SearchCriteria {
    let lower = query.to_lowercase();

    let mut sectors: Vec<String> = Vec::new();
    for &(needle, sector) in keywords::SECTORS {
        if lower.contains(needle) && !sectors.iter().any(|s| s == sector) {
            sectors.push(sector.to_string());
        }
    }

    let mut industries: Vec<String> = Vec::new();
    for &(needle, industry) in keywords::INDUSTRIES {
        if lower.contains(needle) && !industries.iter().any(|s| s == industry) {
            industries.push(industry.to_string());
        }
    }

    let scope = if sectors.is_empty() {
        "all".to_string()
    } else {
        sectors.join(", ")
    };

    SearchCriteria {
        sectors: (!sectors.is_empty()).then_some(sectors),
        industries: (!industries.is_empty()).then_some(industries),
        keywords: lower.split_whitespace().map(str::to_string).collect(),
        description: format!("Keyword search ({scope})"),
        ..SearchCriteria::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scout_llm::{ChatResponse, LlmError, TokenUsage};

    /// LLM stub returning a fixed reply or a fixed failure
    struct ScriptedLlm {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(
            &self,
            _request: ChatRequest,
        ) -> scout_llm::Result<ChatResponse> {
            match &self.reply {
                Some(text) => Ok(ChatResponse {
                    text: text.clone(),
                    usage: TokenUsage::default(),
                }),
                None => Err(LlmError::RequestFailed("service down".to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn interpreter(reply: Option<&str>) -> QueryInterpreter {
        QueryInterpreter::new(
            Arc::new(ScriptedLlm {
                reply: reply.map(str::to_string),
            }),
            Arc::new(InstrumentCatalog::default_universe()),
            Arc::new(ScoutConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_exact_symbol_short_circuits() {
        let result = interpreter(None).interpret("  aapl ").await;
        assert_eq!(result, Interpretation::SymbolLookup("AAPL".to_string()));
    }

    #[tokio::test]
    async fn test_model_output_parsed() {
        let reply = r#"{"sectors": ["Technology"], "sort_by": "volume", "description": "Tech by volume"}"#;
        let result = interpreter(Some(reply)).interpret("busiest tech names").await;

        let Interpretation::Criteria(criteria) = result else {
            panic!("expected criteria");
        };
        assert_eq!(criteria.sectors.unwrap(), vec!["Technology"]);
        assert_eq!(criteria.description, "Tech by volume");
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let result = interpreter(None).interpret("cheap tech stocks").await;

        let Interpretation::Criteria(criteria) = result else {
            panic!("expected criteria");
        };
        assert_eq!(criteria.sectors.unwrap(), vec!["Technology"]);
        assert!(criteria.keywords.contains(&"cheap".to_string()));
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back() {
        let result = interpreter(Some("I think you want energy names."))
            .interpret("energy picks")
            .await;

        let Interpretation::Criteria(criteria) = result else {
            panic!("expected criteria");
        };
        assert_eq!(criteria.sectors.unwrap(), vec!["Energy"]);
    }

    #[test]
    fn test_parse_criteria_recovers_embedded_fragment() {
        let text = "Sure! Here is the parse:\n{\"sectors\": [\"Energy\"]}\nHope that helps.";
        let criteria = parse_criteria(text).unwrap();
        assert_eq!(criteria.sectors.unwrap(), vec!["Energy"]);
    }

    #[test]
    fn test_parse_criteria_rejects_garbage() {
        assert!(parse_criteria("no structure here").is_err());
        assert!(parse_criteria("{not valid json}").is_err());
    }

    #[test]
    fn test_fallback_matches_multiword_industry() {
        let criteria = fallback_criteria("data center REITs please");
        assert_eq!(criteria.industries.unwrap(), vec!["Data Centers"]);
        assert!(criteria.sectors.is_none());
        assert_eq!(criteria.description, "Keyword search (all)");
    }

    #[test]
    fn test_fallback_description_names_sectors() {
        let criteria = fallback_criteria("technology and energy leaders");
        assert_eq!(
            criteria.sectors.as_deref().unwrap(),
            &["Technology".to_string(), "Energy".to_string()][..]
        );
        assert_eq!(criteria.description, "Keyword search (Technology, Energy)");
    }
}
