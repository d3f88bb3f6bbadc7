use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single resource link published by an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Category label, e.g. "course" or "library"
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub url: String,
}

/// A university (or any publishing organization) and its resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// The full, immutable set of organizations loaded for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    organizations: Vec<Organization>,
}

impl Catalogue {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Catalogue { organizations }
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }

    /// Total number of resources across every organization
    pub fn resource_count(&self) -> usize {
        self.organizations.iter().map(|org| org.resources.len()).sum()
    }

    pub fn get(&self, id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|org| org.id == id)
    }
}

/// Searchable field of an index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    OrganizationName,
    #[serde(rename = "type")]
    Type,
    Url,
    Title,
}

impl Field {
    /// Every field, in the order they are matched
    pub const ALL: [Field; 4] = [Field::OrganizationName, Field::Type, Field::Url, Field::Title];
}

/// Flattened projection of one resource plus its owning organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexEntry {
    pub organization_id: String,
    pub organization_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub title: String,
    /// Position of the resource inside its organization
    pub resource_index: usize,
}

impl SearchIndexEntry {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::OrganizationName => &self.organization_name,
            Field::Type => &self.kind,
            Field::Url => &self.url,
            Field::Title => &self.title,
        }
    }
}

/// Span of matched characters inside one field, as char offsets `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub field: Field,
    pub start: usize,
    pub end: usize,
}

/// Search result with entry info, relevance score (lower is better) and highlight spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub entry: SearchIndexEntry,
    pub score: f32,
    /// Position of the entry in the flat index
    pub ref_index: usize,
    pub spans: Vec<MatchSpan>,
}

impl MatchResult {
    pub fn spans_for(&self, field: Field) -> impl Iterator<Item = &MatchSpan> {
        self.spans.iter().filter(move |span| span.field == field)
    }
}

/// Field weights: field -> weight
pub type FieldWeights = HashMap<Field, f32>;

/// A bookmarked resource; `url` is the dedup key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub url: String,
    pub title: String,
}

/// Query text and current page: everything that determines what is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub query_text: String,
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            query_text: String::new(),
            page: 1,
        }
    }
}
