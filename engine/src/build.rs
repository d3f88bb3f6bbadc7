use crate::parse::{field_chars, token_count};
use crate::types::{Catalogue, Field, SearchIndexEntry};

/// One index entry with its fields pre-lowercased and length norms cached
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: SearchIndexEntry,
    /// Lowercased chars per field, in `Field::ALL` order
    pub chars: [Vec<char>; 4],
    /// Field-length norm per field, in `Field::ALL` order
    pub norms: [f32; 4],
}

impl IndexedEntry {
    fn new(entry: SearchIndexEntry) -> Self {
        let chars = Field::ALL.map(|field| field_chars(entry.field(field)));
        let norms = Field::ALL.map(|field| field_norm(entry.field(field)));
        IndexedEntry {
            entry,
            chars,
            norms,
        }
    }
}

/// Flat searchable projection of a catalogue
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedEntry>,
}

impl SearchIndex {
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten every resource of every organization into one entry each.
/// Duplicate urls produce independent entries.
pub fn flatten_catalogue(catalogue: &Catalogue) -> Vec<SearchIndexEntry> {
    catalogue
        .organizations()
        .iter()
        .flat_map(|org| {
            org.resources
                .iter()
                .enumerate()
                .map(move |(resource_index, resource)| SearchIndexEntry {
                    organization_id: org.id.clone(),
                    organization_name: org.name.clone(),
                    kind: resource.kind.clone(),
                    url: resource.url.clone(),
                    title: resource.title.clone(),
                    resource_index,
                })
        })
        .collect()
}

/// Build the search index from a catalogue
pub fn build_index(catalogue: &Catalogue) -> SearchIndex {
    SearchIndex {
        entries: flatten_catalogue(catalogue)
            .into_iter()
            .map(IndexedEntry::new)
            .collect(),
    }
}

/// Shorter fields weigh more: `1 / sqrt(tokens)`, rounded to 3 decimals
pub fn field_norm(text: &str) -> f32 {
    let norm = 1.0 / (token_count(text) as f32).sqrt();
    (norm * 1000.0).round() / 1000.0
}
