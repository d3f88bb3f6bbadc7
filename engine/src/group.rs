use crate::parse::{field_chars, normalize_query};
use crate::types::{Catalogue, Field, MatchResult, Resource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Piece of display text, either plain or inside a highlight marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// A resource as shown in a filtered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedResource {
    pub resource: Resource,
    pub resource_index: usize,
    /// `None` for resources shown only because their organization name matched
    pub score: Option<f32>,
    pub title_segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationGroup {
    pub name: String,
    pub resources: Vec<AnnotatedResource>,
}

/// Organization id -> group, in order of each organization's best match
pub type GroupedResults = IndexMap<String, OrganizationGroup>;

/// Group ranked matches back under their organizations.
///
/// Resources keep the global relevance order. When an organization's name
/// contains the query as a plain substring, its remaining resources are
/// appended in catalogue order.
pub fn group_results(results: &[MatchResult], catalogue: &Catalogue, query: &str) -> GroupedResults {
    let mut groups: GroupedResults = IndexMap::new();

    for result in results {
        let entry = &result.entry;
        let group = groups
            .entry(entry.organization_id.clone())
            .or_insert_with(|| OrganizationGroup {
                name: entry.organization_name.clone(),
                resources: Vec::new(),
            });

        let title_spans: Vec<(usize, usize)> = result
            .spans_for(Field::Title)
            .map(|span| (span.start, span.end))
            .collect();

        group.resources.push(AnnotatedResource {
            resource: Resource {
                kind: entry.kind.clone(),
                title: entry.title.clone(),
                url: entry.url.clone(),
            },
            resource_index: entry.resource_index,
            score: Some(result.score),
            title_segments: highlight(&entry.title, &title_spans),
        });
    }

    let needle = normalize_query(query);
    if needle.is_empty() {
        return groups;
    }

    for (id, group) in groups.iter_mut() {
        let name: String = field_chars(&group.name).into_iter().collect();
        if !name.contains(&needle) {
            continue;
        }
        let Some(org) = catalogue.get(id) else {
            continue;
        };
        let shown: Vec<usize> = group.resources.iter().map(|r| r.resource_index).collect();
        for (resource_index, resource) in org.resources.iter().enumerate() {
            if shown.contains(&resource_index) {
                continue;
            }
            group.resources.push(AnnotatedResource {
                resource: resource.clone(),
                resource_index,
                score: None,
                title_segments: highlight(&resource.title, &[]),
            });
        }
    }

    groups
}

/// Split text into plain and highlighted segments.
///
/// Spans are char offsets `[start, end)`. Overlapping or duplicate spans are
/// merged so each matched substring is wrapped once; out-of-range spans are
/// clamped.
pub fn highlight(text: &str, spans: &[(usize, usize)]) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut sorted: Vec<(usize, usize)> = spans
        .iter()
        .map(|&(start, end)| (start.min(len), end.min(len)))
        .filter(|(start, end)| start < end)
        .collect();
    sorted.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in sorted {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut segments = Vec::new();
    let mut cursor = 0;
    for (start, end) in merged {
        if cursor < start {
            segments.push(Segment {
                text: chars[cursor..start].iter().collect(),
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: chars[start..end].iter().collect(),
            highlighted: true,
        });
        cursor = end;
    }
    if cursor < len || segments.is_empty() {
        segments.push(Segment {
            text: chars[cursor..].iter().collect(),
            highlighted: false,
        });
    }
    segments
}
