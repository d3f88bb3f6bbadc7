#[macro_use]
mod console;

pub mod build;
pub mod catalogue;
pub mod config;
pub mod controller;
pub mod error;
pub mod favorites;
pub mod fuzzy;
pub mod group;
pub mod html;
pub mod parse;
pub mod rank;
pub mod render;
pub mod schedule;
pub mod store;
pub mod theme;
pub mod tour;
pub mod types;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

use crate::build::SearchIndex;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::group::GroupedResults;
use crate::types::{Catalogue, MatchResult};
use web_time::Instant;

/// Search engine state: the session's catalogue with its pre-built index
pub struct SearchEngine {
    catalogue: Catalogue,
    index: SearchIndex,
    config: EngineConfig,
}

impl SearchEngine {
    /// Create a new search engine from a catalogue and config
    pub fn new(catalogue: Catalogue, config: EngineConfig) -> Self {
        let start = Instant::now();
        let index = build::build_index(&catalogue);
        console_log!(
            "[index] organizations={} entries={} | build={:.1}ms",
            catalogue.len(),
            index.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        SearchEngine {
            catalogue,
            index,
            config,
        }
    }

    /// Parse both JSON documents coming from JavaScript
    pub fn from_json(catalogue_json: &str, config_json: &str) -> Result<Self> {
        let catalogue = catalogue::parse_catalogue(catalogue_json)?;
        let config = EngineConfig::from_json(config_json)?;
        Ok(SearchEngine::new(catalogue, config))
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Ranked matches, best first; empty for a blank query
    pub fn search(&self, query: &str) -> Vec<MatchResult> {
        let start = Instant::now();
        let results = rank::search(&self.index, query, &self.config);

        console_log!(
            "[perf] query='{}' entries={} matches={} | total={:.1}ms",
            query,
            self.index.len(),
            results.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        results
    }

    /// Ranked matches grouped under their organizations
    pub fn search_grouped(&self, query: &str) -> GroupedResults {
        let results = self.search(query);
        let start = Instant::now();
        let groups = group::group_results(&results, &self.catalogue, query);

        console_log!(
            "[perf] query='{}' organizations={} | group={:.1}ms",
            query,
            groups.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_engine() -> SearchEngine {
        let test_catalogue = r#"[
            {"id": "u1", "name": "Havana University", "resources": [
                {"type": "course", "title": "Intro to Algorithms", "url": "http://a"}
            ]},
            {"id": "u2", "name": "Matanzas Tech", "resources": [
                {"type": "library", "title": "Digital Library", "url": "http://b"}
            ]}
        ]"#;

        let test_config = r#"{"threshold": 0.3, "page_size": 10}"#;

        SearchEngine::from_json(test_catalogue, test_config).expect("Failed to initialize test engine")
    }

    #[test]
    fn test_search() {
        let engine = setup_test_engine();
        let results = engine.search("library");

        assert!(!results.is_empty(), "Search should return results");
        assert!(results.iter().all(|r| r.entry.organization_id == "u2"));
    }

    #[test]
    fn test_search_grouped() {
        let engine = setup_test_engine();
        let groups = engine.search_grouped("algorithm");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["u1"].name, "Havana University");
    }

    #[test]
    fn test_blank_query_has_no_results() {
        let engine = setup_test_engine();
        assert!(engine.search("   ").is_empty());
    }

    #[test]
    fn test_bad_config_is_rejected() {
        assert!(SearchEngine::from_json("[]", r#"{"page_size": 0}"#).is_err());
    }
}
