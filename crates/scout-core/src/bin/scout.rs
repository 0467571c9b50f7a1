//! Stock Scout CLI
//!
//! An interactive command-line interface for natural-language stock
//! research.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables
//! export GROQ_API_KEY="your-key"
//! export SCOUT_MODEL="llama-3.3-70b-versatile"
//!
//! # Run the CLI
//! cargo run --bin scout -p scout-core
//! ```

use scout_core::{NoopSink, ResearchPipeline, ScoutConfig, YahooMarketData};
use scout_llm::OpenAiCompatProvider;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                        Stock Scout                           ║
║                                                              ║
║  Ask in natural language:                                    ║
║    "show me semiconductor stocks over 100 billion"           ║
║    "energy companies sorted by volume"                       ║
║    "AAPL"                                                    ║
║                                                              ║
║  Commands:                                                   ║
║    /batch   - Refresh the whole universe                     ║
║    /history - Include historical prices in the next query    ║
║    /exit    - Exit                                           ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout_utils::logging::init_tracing();

    print_banner();

    let config = ScoutConfig::builder().from_env().build()?;
    println!("Configuration:");
    println!("  Model: {}", config.model);
    println!("  Workers: {}", config.max_concurrency);
    println!();

    let llm = Arc::new(OpenAiCompatProvider::from_env()?);
    let provider = Arc::new(YahooMarketData::new()?);
    let pipeline = ResearchPipeline::new(llm, provider, config);

    println!("Ready! ({} instruments in the universe)\n", pipeline.catalog().len());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut include_historical = false;

    loop {
        print!("scout> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/history" => {
                include_historical = !include_historical;
                println!(
                    "Historical prices {} for subsequent queries\n",
                    if include_historical { "enabled" } else { "disabled" }
                );
            }
            "/batch" => {
                println!("Refreshing the full universe...");
                let symbols = pipeline.catalog().symbols().to_vec();
                let outcome = pipeline.process_batch(&symbols, &NoopSink).await;
                println!(
                    "Done: {} processed, {} failed{}\n",
                    outcome.processed_count,
                    outcome.failed_count,
                    if outcome.failed_symbols.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", outcome.failed_symbols.join(", "))
                    }
                );
            }
            query => {
                let result = pipeline.process_query(query, include_historical).await;
                println!("{}\n", serde_json::to_string_pretty(&result)?);
            }
        }
    }

    Ok(())
}
