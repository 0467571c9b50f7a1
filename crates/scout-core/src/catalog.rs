//! Static instrument universe
//!
//! The catalog is the fixed set of symbols the system is willing to
//! consider, with descriptive metadata per symbol. It is built once at
//! startup, shared via `Arc`, and never mutated.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

/// Descriptive metadata for one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
}

/// Read-only symbol -> metadata registry
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    entries: HashMap<String, InstrumentMetadata>,
    // Insertion order, so fetch fan-out is deterministic
    symbols: Vec<String>,
}

impl InstrumentCatalog {
    /// Build a catalog from a list of metadata entries
    ///
    /// Symbols are upper-cased; a duplicate symbol keeps the first entry.
    pub fn new(instruments: Vec<InstrumentMetadata>) -> Self {
        let mut entries = HashMap::with_capacity(instruments.len());
        let mut symbols = Vec::with_capacity(instruments.len());

        for mut meta in instruments {
            meta.symbol = meta.symbol.to_uppercase();
            let symbol = meta.symbol.clone();
            if let Entry::Vacant(slot) = entries.entry(symbol.clone()) {
                slot.insert(meta);
                symbols.push(symbol);
            }
        }

        Self { entries, symbols }
    }

    /// The default research universe: large-cap tech, data-center and
    /// tower REITs, and energy utilities
    pub fn default_universe() -> Self {
        let mk = |symbol: &str, name: &str, sector: &str, industry: &str| InstrumentMetadata {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
        };

        Self::new(vec![
            // Tech
            mk("AAPL", "Apple Inc.", "Technology", "Consumer Electronics"),
            mk("MSFT", "Microsoft Corporation", "Technology", "Software"),
            mk("GOOGL", "Alphabet Inc.", "Technology", "Internet Services"),
            mk("AMZN", "Amazon.com Inc.", "Technology", "E-Commerce"),
            mk("META", "Meta Platforms Inc.", "Technology", "Internet Services"),
            mk("NVDA", "NVIDIA Corporation", "Technology", "Semiconductors"),
            mk("AMD", "Advanced Micro Devices Inc.", "Technology", "Semiconductors"),
            mk("INTC", "Intel Corporation", "Technology", "Semiconductors"),
            mk("CSCO", "Cisco Systems Inc.", "Technology", "Networking"),
            mk("ORCL", "Oracle Corporation", "Technology", "Software"),
            // Data center / tower REITs
            mk("EQIX", "Equinix Inc.", "Real Estate", "Data Centers"),
            mk("DLR", "Digital Realty Trust Inc.", "Real Estate", "Data Centers"),
            mk("AMT", "American Tower Corporation", "Real Estate", "Communication Towers"),
            mk("CCI", "Crown Castle Inc.", "Real Estate", "Communication Towers"),
            mk("QTS", "QTS Realty Trust Inc.", "Real Estate", "Data Centers"),
            // Energy utilities
            mk("EXC", "Exelon Corporation", "Energy", "Utilities"),
            mk("DUK", "Duke Energy Corporation", "Energy", "Utilities"),
            mk("SO", "Southern Company", "Energy", "Utilities"),
            mk("NEE", "NextEra Energy Inc.", "Energy", "Utilities"),
            mk("NRG", "NRG Energy Inc.", "Energy", "Utilities"),
        ])
    }

    /// Look up metadata for a symbol (case-insensitive)
    pub fn get(&self, symbol: &str) -> Option<&InstrumentMetadata> {
        self.entries.get(&symbol.to_uppercase())
    }

    /// Whether the catalog contains a symbol (case-insensitive)
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(&symbol.to_uppercase())
    }

    /// All symbols in insertion order
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of instruments
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::default_universe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe_size() {
        let catalog = InstrumentCatalog::default_universe();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.contains("AAPL"));
        assert!(catalog.contains("NRG"));
        assert!(!catalog.contains("BADSYM"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = InstrumentCatalog::default_universe();
        let meta = catalog.get("nvda").unwrap();
        assert_eq!(meta.name, "NVIDIA Corporation");
        assert_eq!(meta.sector, "Technology");
        assert_eq!(meta.industry, "Semiconductors");
    }

    #[test]
    fn test_symbols_preserve_insertion_order() {
        let catalog = InstrumentCatalog::default_universe();
        assert_eq!(catalog.symbols()[0], "AAPL");
        assert_eq!(catalog.symbols()[19], "NRG");
    }

    #[test]
    fn test_duplicate_symbols_keep_first() {
        let meta = |s: &str, n: &str| InstrumentMetadata {
            symbol: s.to_string(),
            name: n.to_string(),
            sector: "Technology".to_string(),
            industry: "Software".to_string(),
        };
        let catalog = InstrumentCatalog::new(vec![meta("MSFT", "first"), meta("msft", "second")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("MSFT").unwrap().name, "first");
    }
}
