use crate::build::{IndexedEntry, SearchIndex};
use crate::config::EngineConfig;
use crate::fuzzy::{fuzzy_match, FuzzyMatch};
use crate::parse::{field_chars, normalize_query};
use crate::types::{Field, MatchResult, MatchSpan};

#[cfg(feature = "native")]
use rayon::prelude::*;

/// Stand-in for a perfect field score so it still contributes to the product
const PERFECT: f32 = f32::EPSILON;

/// Match one field; `None` when the field is looser than the threshold
pub fn field_match(pattern: &[char], chars: &[char], threshold: f32) -> Option<FuzzyMatch> {
    fuzzy_match(pattern, chars).filter(|m| m.score <= threshold)
}

/// Combine accepted field scores: product of `score ^ (weight * norm)`.
///
/// Arguments:
/// - parts: (field score, normalised field weight, field-length norm)
pub fn combined_score(parts: &[(f32, f32, f32)]) -> f32 {
    parts.iter().fold(1.0, |total, &(score, weight, norm)| {
        let base = if score == 0.0 { PERFECT } else { score };
        total * base.powf(weight * norm)
    })
}

/// Score one entry against every field; `None` if no field is accepted
pub fn score_entry(
    indexed: &IndexedEntry,
    pattern: &[char],
    config: &EngineConfig,
) -> Option<(f32, Vec<MatchSpan>)> {
    let mut parts = Vec::new();
    let mut spans = Vec::new();

    for (slot, &field) in Field::ALL.iter().enumerate() {
        let Some(m) = field_match(pattern, &indexed.chars[slot], config.threshold) else {
            continue;
        };
        parts.push((m.score, config.normalized_weight(field), indexed.norms[slot]));
        spans.extend(
            m.spans
                .into_iter()
                .filter(|(start, end)| end - start >= config.min_match_char_length)
                .map(|(start, end)| MatchSpan { field, start, end }),
        );
    }

    if parts.is_empty() {
        None
    } else {
        Some((combined_score(&parts), spans))
    }
}

fn to_result(
    (ref_index, indexed): (usize, &IndexedEntry),
    pattern: &[char],
    config: &EngineConfig,
) -> Option<MatchResult> {
    let (score, spans) = score_entry(indexed, pattern, config)?;
    Some(MatchResult {
        entry: indexed.entry.clone(),
        score,
        ref_index,
        spans,
    })
}

/// Score every entry of the index, keeping index order
#[cfg(feature = "native")]
pub fn score_all(index: &SearchIndex, pattern: &[char], config: &EngineConfig) -> Vec<MatchResult> {
    index
        .entries()
        .par_iter()
        .enumerate()
        .filter_map(|pair| to_result(pair, pattern, config))
        .collect()
}

/// Score every entry of the index, keeping index order
#[cfg(not(feature = "native"))]
pub fn score_all(index: &SearchIndex, pattern: &[char], config: &EngineConfig) -> Vec<MatchResult> {
    index
        .entries()
        .iter()
        .enumerate()
        .filter_map(|pair| to_result(pair, pattern, config))
        .collect()
}

/// Best score first; equal scores keep index order
pub fn rank_results(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.ref_index.cmp(&b.ref_index))
    });
}

/// Get N best results from a ranked list
pub fn top_n(mut ranked: Vec<MatchResult>, n: Option<usize>) -> Vec<MatchResult> {
    if let Some(n) = n {
        ranked.truncate(n);
    }
    ranked
}

/// Normalised query chars, cut to `max_pattern_length`
pub fn query_pattern(query: &str, config: &EngineConfig) -> Vec<char> {
    let mut pattern = field_chars(&normalize_query(query));
    pattern.truncate(config.max_pattern_length);
    while pattern.last().is_some_and(|c| c.is_whitespace()) {
        pattern.pop();
    }
    pattern
}

/// Run a query against the index, best matches first.
/// A blank query yields no results; callers bypass search for it.
pub fn search(index: &SearchIndex, query: &str, config: &EngineConfig) -> Vec<MatchResult> {
    let pattern = query_pattern(query, config);
    if pattern.is_empty() {
        return Vec::new();
    }
    let mut results = score_all(index, &pattern, config);
    rank_results(&mut results);
    top_n(results, config.max_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_index;
    use crate::types::{Catalogue, Organization, Resource};

    fn index() -> SearchIndex {
        build_index(&Catalogue::new(vec![Organization {
            id: "u1".into(),
            name: "Havana University".into(),
            resources: vec![
                Resource {
                    kind: "course".into(),
                    title: "Intro to Algorithms".into(),
                    url: "http://a".into(),
                },
                Resource {
                    kind: "course".into(),
                    title: "Algorithm Design and Analysis of Algorithmic Complexity".into(),
                    url: "http://c".into(),
                },
            ],
        }]))
    }

    fn pattern(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_combined_score() {
        // Higher field score should give a higher (worse) combined score
        let good = combined_score(&[(0.1, 0.25, 1.0)]);
        let bad = combined_score(&[(0.2, 0.25, 1.0)]);
        assert!(good < bad);
        assert!(combined_score(&[(0.0, 0.25, 1.0)]) > 0.0);
        assert_eq!(combined_score(&[]), 1.0);
    }

    #[test]
    fn test_field_match_threshold() {
        assert!(field_match(&pattern("algoritm"), &pattern("algorithms"), 0.3).is_some());
        assert!(field_match(&pattern("xyz"), &pattern("algorithms"), 0.3).is_none());
    }

    #[test]
    fn test_shorter_title_ranks_first() {
        let index = index();
        let config = EngineConfig::default();
        let mut results = score_all(&index, &pattern("algorithm"), &config);
        rank_results(&mut results);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.title, "Intro to Algorithms");
    }

    #[test]
    fn test_spans_are_tagged_by_field() {
        let index = index();
        let config = EngineConfig::default();
        let results = score_all(&index, &pattern("havana"), &config);
        assert_eq!(results.len(), 2);
        let span = results[0].spans_for(Field::OrganizationName).next().unwrap();
        assert_eq!((span.start, span.end), (0, 6));
        assert_eq!(results[0].spans_for(Field::Title).count(), 0);
    }

    #[test]
    fn test_search_normalises_query() {
        let index = index();
        let config = EngineConfig::default();
        let results = search(&index, "  INTRO to Algorithms ", &config);
        assert_eq!(results[0].entry.url, "http://a");
        assert!(search(&index, "   ", &config).is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = index();
        let config = EngineConfig::default();
        assert_eq!(search(&index, "algo", &config), search(&index, "algo", &config));
    }

    #[test]
    fn test_long_query_is_cut_to_max_pattern_length() {
        let config = EngineConfig::default();
        let long = format!("algorithm design and analysis of {}", "x".repeat(2000));
        assert_eq!(query_pattern(&long, &config).len(), 32);

        let results = search(&index(), &long, &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.url, "http://c");
    }

    #[test]
    fn test_cut_pattern_drops_trailing_space() {
        let config = EngineConfig {
            max_pattern_length: 6,
            ..EngineConfig::default()
        };
        assert_eq!(query_pattern("intro to algorithms", &config), pattern("intro"));
    }

    #[test]
    fn test_top_n() {
        let index = index();
        let config = EngineConfig::default();
        let results = score_all(&index, &pattern("course"), &config);
        assert_eq!(top_n(results.clone(), Some(1)).len(), 1);
        assert_eq!(top_n(results, None).len(), 2);
    }
}
