//! Prompt templates for the two LLM calls the pipeline makes

use crate::snapshot::QuoteSnapshot;

/// System prompt for query interpretation
pub const INTERPRET_SYSTEM_PROMPT: &str = r#"You are an expert at stock research queries.
You convert natural-language questions about equities into structured search criteria.
Respond with a single JSON object and nothing else."#;

/// System prompt for per-instrument analysis
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an equity analyst.
Given one stock's latest trading data, produce a short qualitative read.
Respond with a single JSON object and nothing else."#;

/// User prompt asking the model to parse a query into criteria
pub fn interpret_prompt(query: &str) -> String {
    format!(
        r#"Parse the following stock research query into structured form.
Query: {query}

Return JSON with these fields (omit any that do not apply):
- sectors: list of relevant sectors
- industries: list of relevant industries
- market_cap_min: minimum market cap in billions
- market_cap_max: maximum market cap in billions
- volume_min: minimum trading volume
- keywords: list of key terms to match
- sort_by: one of market_cap, volume, current_price, daily_change_percent
- sort_order: asc or desc
- description: human readable interpretation of the query"#
    )
}

/// User prompt asking the model to analyze one snapshot
pub fn analysis_prompt(snapshot: &QuoteSnapshot) -> String {
    let fmt = |v: Option<f64>| v.map_or_else(|| "unknown".to_string(), |x| format!("{x:.2}"));
    let volume = snapshot
        .volume
        .map_or_else(|| "unknown".to_string(), |v| v.to_string());
    let cap = snapshot
        .market_cap_formatted
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        r#"Analyze this stock's latest session.
Symbol: {symbol}
Price: {price} (open {open}, high {high}, low {low})
Daily change: {change} ({change_pct}%)
Volume: {volume}
Market cap: {cap}

Return JSON with these fields:
- performance_summary: one-sentence read on price action
- volume_analysis: one-sentence read on trading volume
- technical_signals: one-sentence read on technical posture
- market_sentiment: one-sentence read on sentiment
- price_strength: strong, neutral, or weak
- volume_signal: high, normal, or low
- trend: bullish, bearish, or neutral
- volatility: high, normal, or low"#,
        symbol = snapshot.symbol,
        price = fmt(snapshot.current_price),
        open = fmt(snapshot.day_open),
        high = fmt(snapshot.day_high),
        low = fmt(snapshot.day_low),
        change = fmt(snapshot.daily_change),
        change_pct = fmt(snapshot.daily_change_percent),
    )
}
